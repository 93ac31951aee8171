use tempfile::TempDir;

use super::{fragment_file_name, fragment_html, write_fragments};
use crate::{
    archive::Archive,
    config::{ANNOTATION_DIR, BuildOptions, FRAGMENT_FILENAME_MAX},
    metadata::{Item, Metadata},
};

fn options() -> BuildOptions {
    BuildOptions {
        check: true,
        no_preview: true,
        ..BuildOptions::default()
    }
}

fn long_item() -> Item {
    Item {
        title: "A Paper".to_string(),
        author: "Alice Johnson".to_string(),
        date: "1975-03-01".to_string(),
        doi: "10.1/abc".to_string(),
        tags: Vec::new(),
        abstract_html: format!(
            "<p>see <a href=\"#appendix\">the appendix</a> and {}</p>",
            "padding text ".repeat(20)
        ),
    }
}

#[test]
fn filename_is_urlencoded_and_capped() {
    let (name, truncated) = fragment_file_name("/doc/a.pdf");
    assert_eq!(name, "%2Fdoc%2Fa%2Epdf.html");
    assert!(!truncated);

    let long_path = format!("/doc/{}.pdf", "x".repeat(400));
    let (name, truncated) = fragment_file_name(&long_path);
    assert!(truncated);
    assert!(name.len() <= FRAGMENT_FILENAME_MAX);
    assert!(name.ends_with(".html"));
    // No dangling percent escape at the cut.
    let stem = name.trim_end_matches(".html");
    assert!(!stem[stem.len() - 2..].contains('%'), "{stem}");
}

#[test]
fn fragment_contains_citation_line_and_blockquote() {
    let tmp = TempDir::new().unwrap();
    let meta = Metadata::empty(tmp.path());
    let archive = Archive::load(tmp.path(), &options()).unwrap();

    let html = fragment_html("/doc/a-2.pdf", &long_item(), &meta, &archive);
    assert!(html.contains(r#"<a class="docMetadata" id="johnson-1975-2" href="/doc/a-2.pdf">A Paper</a>"#), "{html}");
    assert!(html.contains(r#"<span class="author">Alice Johnson</span>"#));
    assert!(html.contains(r#"(<span class="date">1975-03-01</span>)"#));
    assert!(html.contains(r#"href="https://doi.org/10.1/abc""#));
    assert!(html.contains("<blockquote>"));
    // Relative anchors are rebased onto the annotated page.
    assert!(html.contains(r#"href="/doc/a-2.pdf#appendix""#), "{html}");
}

#[test]
fn write_is_atomic_and_skips_unchanged() {
    let tmp = TempDir::new().unwrap();
    let mut meta = Metadata::empty(tmp.path());
    meta.append_auto("/doc/a.pdf", long_item()).unwrap();
    let archive = Archive::load(tmp.path(), &options()).unwrap();

    let first = write_fragments(&meta, &archive, tmp.path()).unwrap();
    assert_eq!(first, 1);
    let dir = tmp.path().join(ANNOTATION_DIR);
    assert!(dir.join("%2Fdoc%2Fa%2Epdf.html").exists());

    // Unchanged content: nothing rewritten.
    let second = write_fragments(&meta, &archive, tmp.path()).unwrap();
    assert_eq!(second, 0);
}

#[test]
fn negative_and_short_items_get_no_fragment() {
    let tmp = TempDir::new().unwrap();
    let mut meta = Metadata::empty(tmp.path());
    meta.append_auto("/doc/dead.pdf", Item::negative()).unwrap();
    let mut short = long_item();
    short.abstract_html = "<p>short</p>".to_string();
    meta.append_auto("/doc/short.pdf", short).unwrap();
    let archive = Archive::load(tmp.path(), &options()).unwrap();

    let written = write_fragments(&meta, &archive, tmp.path()).unwrap();
    assert_eq!(written, 0);
}
