use std::time::Duration;

pub const INPUT_DIR: &str = "contents";
pub const OUTPUT_DIR: &str = "public";
pub const METADATA_DIR: &str = "metadata";
pub const ANNOTATION_DIR: &str = "metadata/annotation";
pub const ARCHIVE_DIR: &str = "doc/www";

pub const CURATED_YAML: &str = "metadata/curated.yaml";
pub const AUTO_YAML: &str = "metadata/auto.yaml";
pub const AUTOLINK_YAML: &str = "metadata/auto-link.yaml";
pub const ARCHIVE_DB: &str = "metadata/archive.json";

// Site-wide identity. Self-authored pages get special citation IDs and are
// never scraped or archived.
pub const SITE_TITLE: &str = "Gwern.net";
pub const SITE_BASE_URL: &str = "https://gwern.net";
pub const SITE_AUTHOR: &str = "Gwern Branwen";
pub const SITE_AUTHOR_ID_PREFIX: &str = "gwern-";

/// Annotations whose abstract is shorter than this render fine as a plain
/// browser tooltip, so they are not marked for popups and get no fragment.
pub const MIN_ABSTRACT_LEN: usize = 180;

/// Mean HSL lightness below which an image counts as near-monochrome and
/// safe to color-invert in dark mode.
pub const INVERT_LIGHTNESS_THRESHOLD: f32 = 0.09;

/// Maximum byte length of an annotation fragment filename.
pub const FRAGMENT_FILENAME_MAX: usize = 274;

/// A footnote whose entire body is a single unspaced run at most this long
/// is almost certainly a mistyped citation anchor.
pub const MALFORMED_NOTE_MAX: usize = 12;

pub const USER_AGENT: &str = "apparatus/0.1 (site annotation scraper)";

pub const ARXIV_DELAY: Duration = Duration::from_secs(15);
pub const CROSSREF_DELAY: Duration = Duration::from_secs(1);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Headless snapshots of heavy pages can legitimately take this long.
pub const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(16 * 60);

// External helpers. Each is an ordinary executable looked up on PATH.
pub const PUBMED_HELPER: &str = "pubmed-fetch";
pub const EXIF_HELPER: &str = "exiftool";
pub const SNAPSHOT_HELPER: &str = "single-file";
pub const PREVIEW_HELPER: &str = "xdg-open";

/// Runtime build options, scanned from the command line.
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Report missing archives instead of fetching them.
    pub check: bool,
    /// Never open snapshots or newly-inverted images for human review.
    pub no_preview: bool,
    /// Upper bound on new archive snapshots per build.
    pub archive_cap: Option<usize>,
    /// Scrape Wikipedia into the store instead of leaving articles to the
    /// client-side popup code.
    pub wikipedia_scrape: bool,
}

impl BuildOptions {
    pub fn from_args<I: Iterator<Item = String>>(args: I) -> Self {
        let mut options = Self::default();
        let mut args = args;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--check" => options.check = true,
                "--no-preview" => options.no_preview = true,
                "--wikipedia-scrape" => options.wikipedia_scrape = true,
                "--archive-cap" => {
                    options.archive_cap = args.next().and_then(|n| n.parse().ok());
                }
                _ => {}
            }
        }
        options
    }
}
