use tempfile::TempDir;

use super::{collect_link_targets, decorate_anchors_html};
use crate::ast::parse::parse_markdown;
use crate::metadata::{Item, Metadata};

fn store_with(url: &str, abstract_len: usize) -> (TempDir, Metadata) {
    let tmp = TempDir::new().unwrap();
    let mut meta = Metadata::empty(tmp.path());
    let item = Item {
        title: "A Paper".to_string(),
        author: "Alice Johnson, Bob Quux".to_string(),
        date: "1975-03-01".to_string(),
        doi: String::new(),
        tags: Vec::new(),
        abstract_html: format!("<p>{}</p>", "x".repeat(abstract_len)),
    };
    meta.append_auto(url, item).unwrap();
    (tmp, meta)
}

#[test]
fn collects_targets_everywhere() {
    let doc = parse_markdown(
        "See [a](/doc/a.pdf) and *[b](https://example.com/b)*.\n\n> [c](/doc/c.pdf)\n",
    );
    let targets = collect_link_targets(&doc);
    assert_eq!(
        targets,
        vec!["/doc/a.pdf", "https://example.com/b", "/doc/c.pdf"]
    );
}

#[test]
fn anchors_in_abstracts_get_decorated() {
    let (_tmp, meta) = store_with("/doc/b.pdf", 400);
    let html = r#"<p>see <a href="/doc/b.pdf">the paper</a> and <a href="/doc/unknown.pdf">another</a></p>"#;
    let out = decorate_anchors_html(html, &meta);
    assert!(
        out.contains(r#"<a class="docMetadata" id="johnson-quux-1975" href="/doc/b.pdf">"#),
        "{out}"
    );
    // Unknown target untouched.
    assert!(out.contains(r#"<a href="/doc/unknown.pdf">"#), "{out}");
    // Decoration is a fixed point.
    assert_eq!(decorate_anchors_html(&out, &meta), out);
}

#[test]
fn short_abstracts_are_not_decorated() {
    let (_tmp, meta) = store_with("/doc/b.pdf", 40);
    let html = r#"<a href="/doc/b.pdf">short</a>"#;
    assert_eq!(decorate_anchors_html(html, &meta), html);
}
