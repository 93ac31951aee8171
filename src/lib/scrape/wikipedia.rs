//! Wikipedia REST summary scraper (only used when articles are annotated
//! in-store rather than by the client-side popup code).

use serde::Deserialize;

use super::{RateLimited, ScrapeError, ScrapeResult, temporary};
use crate::{
    clean::clean_abstract, metadata::Item, transformer::image::InvertCache, utils::escape_attr,
};

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract_html: String,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

pub fn scrape(client: &RateLimited, url: &str, invert: &InvertCache) -> ScrapeResult {
    let article = url
        .rsplit("/wiki/")
        .next()
        .unwrap_or_default()
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if article.is_empty() {
        return Err(ScrapeError::Permanent("no article in wikipedia url".to_string()));
    }

    let api = format!("https://en.wikipedia.org/api/rest_v1/page/summary/{article}");
    let response = client.get(&api).map_err(temporary)?;
    let status = response.status();
    if status.as_u16() == 404 {
        return Err(ScrapeError::Permanent(format!("wikipedia HTTP {status}")));
    }
    if !status.is_success() {
        return Err(ScrapeError::Temporary(format!("wikipedia HTTP {status}")));
    }
    let body = response.text().map_err(temporary)?;
    let summary: Summary = serde_json::from_str(&body)
        .map_err(|e| ScrapeError::Permanent(format!("unparseable wikipedia summary: {e}")))?;

    // A link to a disambiguation page is an authoring error: the build stops
    // until a human points it at the intended article.
    if summary.kind == "disambiguation" {
        return Err(ScrapeError::Fatal(format!(
            "wikipedia disambiguation page linked: {url} (link a specific article)"
        )));
    }
    if summary.title.is_empty() {
        return Err(ScrapeError::Permanent("wikipedia summary has no title".to_string()));
    }

    let mut abstract_html = String::new();
    if let Some(thumbnail) = &summary.thumbnail {
        let class = match invert.remote_is_invertible(&thumbnail.source) {
            Some(true) => " class=\"invertible-auto\"",
            _ => "",
        };
        abstract_html.push_str(&format!(
            "<figure><img{class} src=\"{}\" alt=\"{}\" /></figure>\n",
            escape_attr(&thumbnail.source),
            escape_attr(&summary.title),
        ));
    }
    abstract_html.push_str(&clean_abstract(&summary.extract_html));

    Ok(Item {
        title: summary.title,
        author: "English Wikipedia".to_string(),
        date: String::new(),
        doi: String::new(),
        tags: Vec::new(),
        abstract_html,
    })
}
