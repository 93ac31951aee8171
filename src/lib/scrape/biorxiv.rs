//! bioRxiv / medRxiv scraper: the metadata lives in `<meta>` tags of the
//! article page.

use std::sync::LazyLock;

use regex::Regex;

use super::{RateLimited, ScrapeError, ScrapeResult, author::normalize_authors, temporary};
use crate::{clean::clean_abstract, metadata::Item};

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s+name="([^"]+)"\s+content="([^"]*)""#).expect("static pattern")
});

pub fn scrape(client: &RateLimited, url: &str) -> ScrapeResult {
    let response = client.get(url).map_err(temporary)?;
    let status = response.status();
    if status.as_u16() == 403 || status.as_u16() == 404 {
        return Err(ScrapeError::Permanent(format!("biorxiv HTTP {status}")));
    }
    if !status.is_success() {
        return Err(ScrapeError::Temporary(format!("biorxiv HTTP {status}")));
    }
    let html = response.text().map_err(temporary)?;
    parse_meta_tags(&html)
}

pub fn parse_meta_tags(html: &str) -> ScrapeResult {
    let mut title = String::new();
    let mut date = String::new();
    let mut doi = String::new();
    let mut abstract_html = String::new();
    let mut contributors: Vec<String> = Vec::new();

    for caps in META_TAG.captures_iter(html) {
        let name = &caps[1];
        let content = decode_entities(&caps[2]);
        match name {
            "DC.Title" => title = content,
            "DC.Date" => date = content.chars().take(10).collect(),
            "DC.Contributor" => contributors.push(content),
            "citation_doi" => doi = content,
            "citation_abstract" => abstract_html = content,
            _ => {}
        }
    }

    if title.is_empty() {
        return Err(ScrapeError::Permanent(
            "biorxiv page has no DC.Title meta tag".to_string(),
        ));
    }

    Ok(Item {
        title,
        author: normalize_authors(&contributors.join(", ")),
        date,
        doi,
        tags: Vec::new(),
        abstract_html: clean_abstract(&abstract_html),
    })
}

/// Meta-tag content arrives attribute-escaped; only the named entities the
/// publishers actually emit need decoding.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
