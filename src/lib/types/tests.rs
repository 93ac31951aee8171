use proptest::{
    prelude::*,
    string::string_regex,
    test_runner::{Config, TestRunner},
};

use super::{CanonicalPath, IsoDate, Tag};

#[test]
fn canonicalize_is_idempotent() {
    let mut runner = TestRunner::new(Config {
        cases: 64,
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(
            &string_regex("(https://gwern\\.net)?(\\./)?/?[A-Za-z0-9/._-]{0,24}(#[A-Za-z0-9-]{0,8})?")
                .unwrap(),
            |raw| {
                let once = CanonicalPath::new(&raw);
                let twice = CanonicalPath::new(once.as_str());
                prop_assert_eq!(once.as_str(), twice.as_str());
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn canonicalize_strips_site_prefix() {
    let p = CanonicalPath::new("https://gwern.net/doc/stats/1975-johnson.pdf");
    assert_eq!(p.as_str(), "/doc/stats/1975-johnson.pdf");

    let p = CanonicalPath::new("./notes/attention");
    assert_eq!(p.as_str(), "notes/attention");

    // Foreign URLs are untouched.
    let p = CanonicalPath::new("https://gwern.network/doc/x");
    assert_eq!(p.as_str(), "https://gwern.network/doc/x");
}

#[test]
fn fragment_is_kept_for_display_but_not_lookup() {
    let p = CanonicalPath::new("https://gwern.net/improvement#conscientiousness");
    assert_eq!(p.as_str(), "/improvement#conscientiousness");
    assert_eq!(p.key(), "/improvement");
    assert_eq!(p.fragment(), Some("conscientiousness"));
}

#[test]
fn iso_date_roundtrips() {
    let mut runner = TestRunner::new(Config {
        cases: 32,
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(&(1970i32..=2100, 1u32..=12, 1u32..=28), |(year, month, day)| {
            let s = format!("{year:04}-{month:02}-{day:02}");
            let parsed = IsoDate::parse(&s).expect("valid date");
            prop_assert_eq!(parsed.as_str(), s);
            prop_assert_eq!(parsed.year(), year);
            Ok(())
        })
        .unwrap();
}

#[test]
fn iso_date_rejects_out_of_range() {
    let mut runner = TestRunner::new(Config {
        cases: 16,
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(&(1970i32..=2100, 13u32..=99, 32u32..=99), |(year, month, day)| {
            let s = format!("{year:04}-{month:02}-{day:02}");
            prop_assert!(IsoDate::parse(&s).is_none());
            Ok(())
        })
        .unwrap();
}

#[test]
fn tag_accepts_slash_separated_paths() {
    let tag = Tag::parse("statistics/peer-review").expect("valid tag");
    assert_eq!(tag.segments().collect::<Vec<_>>(), ["statistics", "peer-review"]);
}

#[test]
fn tag_rejects_malformed() {
    for bad in ["", "/leading", "trailing/", "a//b", "sp ace", "ex!clam"] {
        assert!(Tag::parse(bad).is_none(), "should reject {bad:?}");
    }
}
