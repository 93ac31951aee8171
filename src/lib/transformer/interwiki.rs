//! Interwiki shorthand: `[Attention](!W)` and friends resolve to concrete
//! Wikipedia URLs. The link title, when present, overrides the article name.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::ast::{Doc, inlines_text};

const INTERWIKI: &[(&str, &str)] = &[
    ("!W", "https://en.wikipedia.org/wiki/"),
    ("!Wikipedia", "https://en.wikipedia.org/wiki/"),
    ("!WP", "https://en.wikipedia.org/wiki/"),
];

/// Characters that must not appear raw in an article path segment.
const ARTICLE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#')
    .add(b'%');

pub fn run(doc: &mut Doc) {
    doc.walk_links_mut(&mut |link| {
        let Some((_, base)) = INTERWIKI.iter().find(|(prefix, _)| link.url == *prefix) else {
            return;
        };
        let article = if link.title.is_empty() {
            inlines_text(&link.content)
        } else {
            link.title.clone()
        };
        let article = article.trim().replace(' ', "_");
        link.url = format!("{base}{}", utf8_percent_encode(&article, ARTICLE));
        link.title.clear();
    });
}
