//! Local PDF scraper: embedded metadata via exiftool, then Crossref for the
//! abstract when the PDF carries a DOI.

use std::path::Path;
use std::process::Command;

use tracing::warn;

use super::{RateLimited, ScrapeError, ScrapeResult, author::normalize_authors, crossref};
use crate::{config::EXIF_HELPER, metadata::Item};

/// PDF producers that end up in the Author field when the real authors are
/// in Creator, or vice versa.
const SOFTWARE_AUTHORS: &[&str] = &[
    "Adobe", "Acrobat", "InDesign", "LaTeX", "pdfTeX", "XeTeX", "LuaTeX", "TeX output",
    "Microsoft", "Word", "PowerPoint", "ABBYY", "FineReader", "OCR", "Ghostscript", "PScript",
    "Quartz", "PDFium", "Springer", "Arbortext",
];

pub fn scrape(root: &Path, url: &str, crossref_client: &RateLimited) -> ScrapeResult {
    let local = root.join(url.trim_start_matches('/'));
    if !local.is_file() {
        return Err(ScrapeError::Permanent(format!(
            "no local file at {}",
            local.display()
        )));
    }

    let output = Command::new(EXIF_HELPER)
        .args(["-json", "-Title", "-Author", "-Date", "-CreateDate", "-DOI", "-Creator"])
        .arg(&local)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScrapeError::Temporary(format!("{EXIF_HELPER} is not installed"))
            } else {
                ScrapeError::Temporary(format!("{EXIF_HELPER} failed to spawn: {e}"))
            }
        })?;
    if !output.status.success() {
        return Err(ScrapeError::Permanent(format!(
            "{EXIF_HELPER} could not read {}",
            local.display()
        )));
    }

    let fields: serde_json::Value =
        serde_json::from_slice(&output.stdout).map_err(|e| {
            ScrapeError::Permanent(format!("unparseable {EXIF_HELPER} output: {e}"))
        })?;
    let fields = fields
        .get(0)
        .cloned()
        .ok_or_else(|| ScrapeError::Permanent("empty exif output".to_string()))?;

    let get = |key: &str| -> String {
        fields
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let title = get("Title");
    let author = pick_author(&get("Author"), &get("Creator"));
    let date = normalize_exif_date(&if get("Date").is_empty() {
        get("CreateDate")
    } else {
        get("Date")
    });
    let doi = get("DOI");

    let abstract_html = crossref::abstract_for_doi(crossref_client, &doi)?.unwrap_or_default();

    if title.is_empty() && author.is_empty() && abstract_html.is_empty() {
        return Err(ScrapeError::Permanent(format!(
            "no embedded metadata in {}",
            local.display()
        )));
    }

    Ok(Item {
        title,
        author: normalize_authors(&author),
        date,
        doi,
        tags: Vec::new(),
        abstract_html,
    })
}

/// The Author field is frequently the typesetting software while the humans
/// hide in Creator (or the reverse). Prefer Creator when Author looks like a
/// tool or Creator simply carries more of a name.
pub fn pick_author(author: &str, creator: &str) -> String {
    let author_is_software = SOFTWARE_AUTHORS.iter().any(|s| author.contains(s));
    if author_is_software || creator.len() > author.len() {
        if author_is_software && !author.is_empty() {
            warn!(author, creator, "author field looks like software; using creator");
        }
        creator.to_string()
    } else {
        author.to_string()
    }
}

/// exiftool dates come back as `2019:03:04 10:11:12`; the store wants ISO.
pub fn normalize_exif_date(raw: &str) -> String {
    let date_part: String = raw.chars().take(10).collect();
    date_part.replace(':', "-")
}
