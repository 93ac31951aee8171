//! arXiv Atom API scraper.

use itertools::Itertools;
use serde::Deserialize;

use super::{RateLimited, ScrapeError, ScrapeResult, author::normalize_authors, temporary};
use crate::{clean::clean_abstract, metadata::Item, scrape::latex::latex_to_html};

/// Extract the arXiv identifier from an abstract or PDF URL.
pub fn arxiv_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("arxiv.org/")?;
    let rest = rest
        .strip_prefix("abs/")
        .or_else(|| rest.strip_prefix("pdf/"))?;
    let id = rest
        .split(['?', '#'])
        .next()
        .unwrap_or(rest)
        .trim_end_matches(".pdf")
        .trim_end_matches('/');
    (!id.is_empty()).then(|| id.to_string())
}

pub fn scrape(client: &RateLimited, id: &str) -> ScrapeResult {
    let api = format!("https://export.arxiv.org/api/query?id_list={id}");
    let response = client.get(&api).map_err(temporary)?;
    if !response.status().is_success() {
        return Err(ScrapeError::Temporary(format!(
            "arxiv api HTTP {}",
            response.status()
        )));
    }
    let body = response.text().map_err(temporary)?;
    parse_atom(&body)
}

/// Parse the Atom response into an item. Malformed or empty feeds are
/// permanent: the id itself is wrong and retrying will not fix it.
pub fn parse_atom(body: &str) -> ScrapeResult {
    let feed: Feed = quick_xml::de::from_str(body)
        .map_err(|e| ScrapeError::Permanent(format!("unparseable arxiv atom feed: {e}")))?;
    let entry = feed
        .entries
        .into_iter()
        .next()
        .ok_or_else(|| ScrapeError::Permanent("no entry in arxiv atom feed".to_string()))?;

    let title = collapse_whitespace(&entry.title);
    if title.is_empty() {
        return Err(ScrapeError::Permanent("arxiv entry has no title".to_string()));
    }
    let author = normalize_authors(
        &entry
            .authors
            .iter()
            .map(|a| a.name.trim())
            .filter(|n| !n.is_empty())
            .join(", "),
    );
    let date: String = entry.published.chars().take(10).collect();
    let abstract_html = clean_abstract(&latex_to_html(entry.summary.trim()));

    Ok(Item {
        title,
        author,
        date,
        doi: entry.doi.unwrap_or_default(),
        tags: Vec::new(),
        abstract_html,
    })
}

/// The API hard-wraps titles; collapse the runs it leaves behind.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    title: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(default)]
    published: String,
    #[serde(rename = "arxiv:doi", alias = "doi", default)]
    doi: Option<String>,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}
