//! Author-string normalization shared by every scraper.

use std::sync::LazyLock;

use regex::Regex;

static SQUASHED_INITIAL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])\.([A-Z])\.").expect("static pattern"));
static SQUASHED_INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z])\.([A-Za-z])").expect("static pattern"));
static BARE_INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]) ([A-Z][a-z])").expect("static pattern"));
static MANY_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"  +").expect("static pattern"));

/// Standardize an author list: comma separators, spaced initials, and a
/// period after bare single-capital initials.
pub fn normalize_authors(raw: &str) -> String {
    let mut s = raw
        .replace(", and ", ", ")
        .replace(", & ", ", ")
        .replace(" and ", ", ")
        .replace(" & ", ", ");

    // "A.B. Smith" to "A. B. Smith"; twice, since matches cannot overlap.
    s = SQUASHED_INITIAL_PAIR.replace_all(&s, "$1. $2.").into_owned();
    s = SQUASHED_INITIAL_PAIR.replace_all(&s, "$1. $2.").into_owned();
    // "A.Smith" to "A. Smith".
    s = SQUASHED_INITIAL.replace_all(&s, "$1. $2").into_owned();
    // "A Smith" to "A. Smith".
    s = BARE_INITIAL.replace_all(&s, "$1. $2").into_owned();

    MANY_SPACES.replace_all(s.trim(), " ").into_owned()
}
