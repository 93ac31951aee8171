//! Scraping missing annotations from external bibliographic sources.
//!
//! The dispatcher routes a canonical path to the right scraper, first match
//! wins. Every scraper error is classified at this boundary: permanent
//! failures become negative cache entries in the auto file; temporary
//! failures are not cached and retry next build.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::{
    config::{ARXIV_DELAY, BuildOptions, CROSSREF_DELAY, SITE_BASE_URL},
    metadata::Item,
    transformer::image::InvertCache,
    types::CanonicalPath,
};

pub mod arxiv;
pub mod author;
pub mod biorxiv;
pub mod crossref;
pub mod latex;
pub mod pdf;
pub mod pubmed;
pub mod rate;
pub mod wikipedia;

use rate::RateLimited;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Do not cache; retry next build.
    #[error("temporary scrape failure: {0}")]
    Temporary(String),
    /// Cache negatively so future builds skip the URL.
    #[error("permanent scrape failure: {0}")]
    Permanent(String),
    /// Data error a human must fix; aborts the build.
    #[error("{0}")]
    Fatal(String),
}

pub type ScrapeResult = Result<Item, ScrapeError>;

pub(crate) fn temporary(err: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Temporary(err.to_string())
}

/// Where a URL routes. First match wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Wikipedia,
    Arxiv(String),
    Biorxiv,
    Pubmed,
    Empty,
    LocalPdf,
    SelfPage,
    Unscrapable,
}

const PUBMED_HOSTS: &[&str] = &[
    "www.ncbi.nlm.nih.gov/pmc",
    "pmc.ncbi.nlm.nih.gov",
    "journals.plos.org",
    "journals.plosone.org",
    "www.plosone.org",
    "www.plosmedicine.org",
    "www.plosbiology.org",
    "www.ploscompbiol.org",
    "www.plosgenetics.org",
];

pub fn route(url: &str) -> Route {
    if url.contains("wikipedia.org/wiki/") {
        return Route::Wikipedia;
    }
    if let Some(id) = arxiv::arxiv_id(url) {
        return Route::Arxiv(id);
    }
    if url.contains("biorxiv.org/content/") || url.contains("medrxiv.org/content/") {
        return Route::Biorxiv;
    }
    if PUBMED_HOSTS.iter().any(|host| url.contains(host)) {
        return Route::Pubmed;
    }
    if url.is_empty() {
        return Route::Empty;
    }
    if url.starts_with('/') && url.to_ascii_lowercase().ends_with(".pdf") {
        return Route::LocalPdf;
    }
    if url.starts_with(['/', '?']) || url.starts_with(SITE_BASE_URL) {
        return Route::SelfPage;
    }
    Route::Unscrapable
}

pub struct Dispatcher {
    root: PathBuf,
    options: BuildOptions,
    arxiv_client: RateLimited,
    crossref_client: RateLimited,
    plain_client: RateLimited,
    invert: Arc<InvertCache>,
}

impl Dispatcher {
    pub fn new(
        root: &Path,
        options: &BuildOptions,
        invert: Arc<InvertCache>,
    ) -> color_eyre::Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            options: options.clone(),
            arxiv_client: RateLimited::new(ARXIV_DELAY)?,
            crossref_client: RateLimited::new(CROSSREF_DELAY)?,
            plain_client: RateLimited::new(std::time::Duration::ZERO)?,
            invert,
        })
    }

    pub fn scrape(&self, path: &CanonicalPath) -> ScrapeResult {
        let url = path.key();
        debug!(url, "dispatching scrape");
        match route(url) {
            Route::Wikipedia => {
                if self.options.wikipedia_scrape {
                    wikipedia::scrape(&self.plain_client, url, &self.invert)
                } else {
                    Err(ScrapeError::Temporary(
                        "wikipedia popups are materialized client-side".to_string(),
                    ))
                }
            }
            Route::Arxiv(id) => arxiv::scrape(&self.arxiv_client, &id),
            Route::Biorxiv => biorxiv::scrape(&self.plain_client, url),
            Route::Pubmed => pubmed::scrape(url),
            Route::Empty => Err(ScrapeError::Permanent("empty url".to_string())),
            Route::LocalPdf => pdf::scrape(&self.root, url, &self.crossref_client),
            Route::SelfPage => Err(ScrapeError::Permanent(
                "self-page; annotated from its own metadata at read time".to_string(),
            )),
            Route::Unscrapable => Err(ScrapeError::Permanent(
                "no scraper handles this domain".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests;
