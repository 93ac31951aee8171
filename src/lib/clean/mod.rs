//! Scraped-abstract normalization.
//!
//! Every abstract that enters the metadata store passes through
//! [`clean_abstract`]: an ordered composition of regex substitutions followed
//! by a long ordered list of fixed-string substitutions and a final trim.
//! The composition reaches a fixed point in one application; rules are
//! written so their output never re-matches them.

use std::sync::LazyLock;

use regex::Regex;

mod rules;

use rules::{LITERAL_RULES, REGEX_RULES};

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    REGEX_RULES
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(pattern).expect("abstract-cleaning pattern is valid");
            (re, *replacement)
        })
        .collect()
});

pub fn clean_abstract(html: &str) -> String {
    let mut out = html.to_string();

    for (re, replacement) in COMPILED.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }

    for (before, after) in LITERAL_RULES {
        out = replace_to_fixpoint(out, before, after);
    }

    out.trim().to_string()
}

/// Repeated replacement until nothing changes. Most rules converge in one
/// pass; collapse rules (`<em><em>`) need the loop.
fn replace_to_fixpoint(mut s: String, before: &str, after: &str) -> String {
    loop {
        let next = s.replace(before, after);
        if next == s {
            return next;
        }
        s = next;
    }
}
