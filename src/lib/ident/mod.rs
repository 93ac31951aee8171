//! Deterministic citation identifiers.
//!
//! The fragment ID doubles as the `id=` attribute of the inline citation
//! link and as the anchor other pages target, so it must be a pure function
//! of (url, author, date). Collisions are left to the HTML validator and a
//! human; nothing here deduplicates.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{SITE_AUTHOR, SITE_AUTHOR_ID_PREFIX, SITE_BASE_URL};

static PAREN_AFFILIATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("static pattern"));
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9]+)$").expect("static pattern"));

pub fn generate_id(url: &str, author: &str, date: &str) -> String {
    if author.trim().is_empty() || date.trim().is_empty() {
        return String::new();
    }
    // Wikipedia links are identified by the article itself.
    if url.contains("wikipedia.org/") {
        return String::new();
    }
    if author.trim() == SITE_AUTHOR {
        return sanitize(&format!("{SITE_AUTHOR_ID_PREFIX}{}", self_page_slug(url)));
    }

    let authors: Vec<&str> = author
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();
    let year = year_of(date);

    let base = match authors.len() {
        0 => return String::new(),
        1 => format!("{}-{year}", surname(authors[0])),
        2 => format!("{}-{}-{year}", surname(authors[0]), surname(authors[1])),
        _ => format!("{}-et-al-{year}", surname(authors[0])),
    };

    sanitize(&format!("{base}{}", disambiguating_suffix(url)))
}

/// First four characters of the date; the original corpus predates dates
/// with fewer digits, so a bare default stands in for a malformed one.
fn year_of(date: &str) -> String {
    let year: String = date.chars().take(4).collect();
    if year.len() == 4 { year } else { "2020".to_string() }
}

/// The alphabetic tail of the first comma-separated author, affiliations in
/// parentheses stripped: "Alice Johnson (MIT)" yields "Johnson".
fn surname(author: &str) -> String {
    let cleaned = PAREN_AFFILIATION.replace_all(author, "");
    let cleaned = cleaned.trim();
    let tail: String = cleaned
        .chars()
        .rev()
        .take_while(|ch| ch.is_alphabetic())
        .collect();
    tail.chars().rev().collect()
}

/// A numeric suffix on the URL basename distinguishes multiple works by the
/// same authors in the same year; `-1` is implied by the unsuffixed name and
/// is dropped.
fn disambiguating_suffix(url: &str) -> String {
    let basename = url.rsplit('/').next().unwrap_or(url);
    let stem = basename.split_once('.').map_or(basename, |(s, _)| s);
    match TRAILING_NUMBER
        .captures(stem)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        Some("1") | None => String::new(),
        Some(n) => format!("-{n}"),
    }
}

fn self_page_slug(url: &str) -> String {
    let lowered = url.to_lowercase();
    let stripped = lowered
        .strip_prefix(&SITE_BASE_URL.to_lowercase())
        .unwrap_or(&lowered);
    stripped
        .replace("--", "")
        .replace(['.', '/', '#'], "")
}

/// Lowercase, drop periods, and keep only characters legal in a fragment.
fn sanitize(id: &str) -> String {
    id.chars()
        .flat_map(char::to_lowercase)
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
        .collect()
}
