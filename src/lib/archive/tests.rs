use std::fs;

use tempfile::TempDir;

use super::{Archive, ArchiveError, ArchiveState, snapshot_key};
use crate::config::{ARCHIVE_DB, ARCHIVE_DIR, BuildOptions};

fn check_options() -> BuildOptions {
    BuildOptions {
        check: true,
        no_preview: true,
        ..BuildOptions::default()
    }
}

fn plant_snapshot(root: &std::path::Path, url: &str, ext: &str) -> String {
    let (domain, hash) = snapshot_key(url).unwrap();
    let rel = format!("{ARCHIVE_DIR}/{domain}/{hash}.{ext}");
    let path = root.join(&rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "<html>snapshot</html>").unwrap();
    format!("/{rel}")
}

#[test]
fn snapshot_key_shape() {
    let (domain, hash) = snapshot_key("https://Example.COM/a/b?q=1").unwrap();
    assert_eq!(domain, "example.com");
    assert_eq!(hash.len(), 40);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    // Deterministic.
    assert_eq!(snapshot_key("https://Example.COM/a/b?q=1").unwrap().1, hash);
}

#[test]
fn existing_snapshot_short_circuits_even_in_check_mode() {
    let tmp = TempDir::new().unwrap();
    let url = "https://example.com/a";
    let expected = plant_snapshot(tmp.path(), url, "html");

    let archive = Archive::load(tmp.path(), &check_options()).unwrap();
    assert_eq!(archive.resolve(url).unwrap(), expected);
    // Second call: same path, still no fetch.
    assert_eq!(archive.resolve(url).unwrap(), expected);
    assert_eq!(archive.state_of(url), Some(ArchiveState::Succeeded));
}

#[test]
fn fragment_is_preserved_on_the_returned_path() {
    let tmp = TempDir::new().unwrap();
    let url = "https://example.com/paper";
    let expected = plant_snapshot(tmp.path(), url, "pdf");

    let archive = Archive::load(tmp.path(), &check_options()).unwrap();
    let got = archive.resolve("https://example.com/paper#page=5").unwrap();
    assert_eq!(got, format!("{expected}#page=5"));
}

#[test]
fn check_mode_misses_fail_without_fetching() {
    let tmp = TempDir::new().unwrap();
    let archive = Archive::load(tmp.path(), &check_options()).unwrap();
    match archive.resolve("https://example.com/missing") {
        Err(ArchiveError::Temporary { .. }) => {}
        other => panic!("expected temporary failure in check mode, got {other:?}"),
    }
}

#[test]
fn store_roundtrips_through_save_and_load() {
    let tmp = TempDir::new().unwrap();
    let url = "https://example.com/a";
    plant_snapshot(tmp.path(), url, "html");

    let archive = Archive::load(tmp.path(), &check_options()).unwrap();
    archive.resolve(url).unwrap();
    archive.save().unwrap();

    let db = tmp.path().join(ARCHIVE_DB);
    assert!(db.exists());

    let reloaded = Archive::load(tmp.path(), &check_options()).unwrap();
    assert_eq!(reloaded.state_of(url), Some(ArchiveState::Succeeded));
}

#[test]
fn recorded_permanent_failures_stay_failed() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join(ARCHIVE_DB);
    fs::create_dir_all(db.parent().unwrap()).unwrap();
    fs::write(
        &db,
        serde_json::json!([{
            "url": "https://example.com/dead",
            "state": "PermanentFailure",
            "local_path": ""
        }])
        .to_string(),
    )
    .unwrap();

    let archive = Archive::load(tmp.path(), &check_options()).unwrap();
    match archive.resolve("https://example.com/dead") {
        Err(ArchiveError::Permanent { .. }) => {}
        other => panic!("expected permanent failure, got {other:?}"),
    }
}
