use std::fs;

use tempfile::TempDir;

use super::{Item, Metadata, Record, tags_for_path};
use crate::config::{AUTO_YAML, CURATED_YAML};

fn write_curated(root: &std::path::Path, records: &[Record]) {
    let path = root.join(CURATED_YAML);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_yaml::to_string(records).unwrap()).unwrap();
}

fn record(url: &str, title: &str, abstract_html: &str) -> Record {
    (
        url.to_string(),
        title.to_string(),
        "Alice Johnson".to_string(),
        "1975-03-01".to_string(),
        String::new(),
        abstract_html.to_string(),
    )
}

#[test]
fn load_unions_curated_over_auto() {
    let tmp = TempDir::new().unwrap();
    write_curated(
        tmp.path(),
        &[record("/doc/a.pdf", "Curated Title", "<p>curated</p>")],
    );
    let auto = vec![
        record("/doc/a.pdf", "Scraped Title", "<p>scraped</p>"),
        record("/doc/b.pdf", "Other Title", "<p>other</p>"),
    ];
    let auto_path = tmp.path().join(AUTO_YAML);
    fs::write(&auto_path, serde_yaml::to_string(&auto).unwrap()).unwrap();

    let meta = Metadata::load(tmp.path()).unwrap();
    assert_eq!(meta.len(), 2);
    assert_eq!(meta.lookup("/doc/a.pdf").unwrap().title, "Curated Title");
    assert_eq!(meta.lookup("/doc/b.pdf").unwrap().title, "Other Title");
}

#[test]
fn duplicate_url_in_curated_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write_curated(
        tmp.path(),
        &[
            record("/doc/a.pdf", "One", "<p>one</p>"),
            record("/doc/a.pdf", "Two", "<p>two</p>"),
        ],
    );
    let err = Metadata::load(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("/doc/a.pdf"), "{err}");
}

#[test]
fn duplicate_title_and_abstract_are_fatal() {
    let tmp = TempDir::new().unwrap();
    write_curated(
        tmp.path(),
        &[
            record("/doc/a.pdf", "Same", "<p>one</p>"),
            record("/doc/b.pdf", "Same", "<p>two</p>"),
        ],
    );
    assert!(Metadata::load(tmp.path()).is_err());

    write_curated(
        tmp.path(),
        &[
            record("/doc/a.pdf", "One", "<p>same</p>"),
            record("/doc/b.pdf", "Two", "<p>same</p>"),
        ],
    );
    assert!(Metadata::load(tmp.path()).is_err());
}

#[test]
fn empty_mandatory_field_is_fatal_with_url_named() {
    let tmp = TempDir::new().unwrap();
    let mut bad = record("/doc/a.pdf", "Title", "<p>x</p>");
    bad.2 = String::new(); // author
    write_curated(tmp.path(), &[bad]);
    let err = Metadata::load(tmp.path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("author") && msg.contains("/doc/a.pdf"), "{msg}");
}

#[test]
fn url_shape_invariants() {
    let tmp = TempDir::new().unwrap();
    write_curated(tmp.path(), &[record("ftp://x", "T", "<p>a</p>")]);
    assert!(Metadata::load(tmp.path()).is_err());

    write_curated(tmp.path(), &[record("/doc/a b.pdf", "T", "<p>a</p>")]);
    assert!(Metadata::load(tmp.path()).is_err());
}

#[test]
fn missing_curated_is_fatal_but_missing_auto_is_not() {
    let tmp = TempDir::new().unwrap();
    assert!(Metadata::load(tmp.path()).is_err());

    write_curated(tmp.path(), &[record("/doc/a.pdf", "T", "<p>a</p>")]);
    let meta = Metadata::load(tmp.path()).unwrap();
    assert_eq!(meta.len(), 1);
}

#[test]
fn auto_file_is_compacted_on_load() {
    let tmp = TempDir::new().unwrap();
    write_curated(tmp.path(), &[record("/doc/a.pdf", "T", "<p>a</p>")]);

    // Two entries for the same key: last write wins, file is rewritten.
    let auto = vec![
        record("/doc/dup.pdf", "Old", "<p>old</p>"),
        record("/doc/dup.pdf", "New", "<p>new</p>"),
    ];
    let auto_path = tmp.path().join(AUTO_YAML);
    fs::write(&auto_path, serde_yaml::to_string(&auto).unwrap()).unwrap();

    let meta = Metadata::load(tmp.path()).unwrap();
    assert_eq!(meta.lookup("/doc/dup.pdf").unwrap().title, "New");

    let rewritten: Vec<Record> =
        serde_yaml::from_str(&fs::read_to_string(&auto_path).unwrap()).unwrap();
    assert_eq!(rewritten.len(), 1);
    assert_eq!(rewritten[0].1, "New");
}

#[test]
fn append_auto_survives_reload() {
    let tmp = TempDir::new().unwrap();
    write_curated(tmp.path(), &[record("/doc/a.pdf", "T", "<p>a</p>")]);

    let mut meta = Metadata::load(tmp.path()).unwrap();
    let item = Item {
        title: "Scraped".to_string(),
        author: "Bob Quux".to_string(),
        date: "2020-01-01".to_string(),
        doi: "10.1/xyz".to_string(),
        tags: Vec::new(),
        abstract_html: "<p>scraped abstract</p>".to_string(),
    };
    meta.append_auto("https://example.com/paper", item.clone()).unwrap();
    assert!(meta.contains("https://example.com/paper"));

    // Negative entries append too, so the URL is skipped next build.
    meta.append_auto("https://example.com/dead", Item::negative())
        .unwrap();

    let reloaded = Metadata::load(tmp.path()).unwrap();
    assert_eq!(
        reloaded.lookup("https://example.com/paper").unwrap().title,
        "Scraped"
    );
    assert!(
        reloaded
            .lookup("https://example.com/dead")
            .unwrap()
            .is_negative()
    );
}

#[test]
fn lookup_canonicalizes_and_ignores_fragment() {
    let tmp = TempDir::new().unwrap();
    write_curated(tmp.path(), &[record("/doc/a.pdf", "T", "<p>a</p>")]);
    let meta = Metadata::load(tmp.path()).unwrap();

    assert!(meta.contains("https://gwern.net/doc/a.pdf"));
    assert!(meta.contains("/doc/a.pdf#page=3"));
}

#[test]
fn recurse_inline_rewrites_abstracts_one_level() {
    let tmp = TempDir::new().unwrap();
    write_curated(
        tmp.path(),
        &[record("/doc/a.pdf", "T", "<p>see <a href=\"/doc/b.pdf\">b</a></p>")],
    );
    let mut meta = Metadata::load(tmp.path()).unwrap();
    meta.recurse_inline(|html, _| html.replace("<a ", "<a class=\"docMetadata\" "));
    assert!(
        meta.lookup("/doc/a.pdf")
            .unwrap()
            .abstract_html
            .contains("docMetadata")
    );
}

#[test]
fn tags_derive_from_doc_directory() {
    assert_eq!(
        tags_for_path("/doc/statistics/peer-review/1975-x.pdf"),
        vec!["statistics/peer-review".to_string()]
    );
    assert!(tags_for_path("/doc/top.pdf").is_empty());
    assert!(tags_for_path("https://example.com/x").is_empty());
}
