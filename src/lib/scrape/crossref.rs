//! DOI to abstract via the Crossref works API.

use super::{RateLimited, ScrapeError, temporary};
use crate::clean::clean_abstract;

/// Fetch the abstract registered for a DOI, if any. Crossref signals an
/// unknown DOI with a plain-text body rather than a status code.
pub fn abstract_for_doi(client: &RateLimited, doi: &str) -> Result<Option<String>, ScrapeError> {
    if doi.trim().is_empty() {
        return Ok(None);
    }
    let api = format!("https://api.crossref.org/works/{doi}");
    let response = client.get(&api).map_err(temporary)?;
    let status = response.status();
    let body = response.text().map_err(temporary)?;
    if body.trim() == "Resource not found." {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ScrapeError::Temporary(format!("crossref HTTP {status}")));
    }
    let json: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| ScrapeError::Permanent(format!("unparseable crossref response: {e}")))?;
    Ok(json
        .pointer("/message/abstract")
        .and_then(|v| v.as_str())
        .map(clean_abstract)
        .filter(|s| !s.is_empty()))
}
