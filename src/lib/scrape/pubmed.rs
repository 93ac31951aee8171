//! PubMed / PLOS scraper, delegated to an external helper that prints
//! exactly five lines: title, author, date, doi, abstract.

use std::process::Command;

use super::{ScrapeError, ScrapeResult, author::normalize_authors};
use crate::{clean::clean_abstract, config::PUBMED_HELPER, metadata::Item};

pub fn scrape(url: &str) -> ScrapeResult {
    let output = Command::new(PUBMED_HELPER)
        .arg(url)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScrapeError::Temporary(format!("{PUBMED_HELPER} is not installed"))
            } else {
                ScrapeError::Temporary(format!("{PUBMED_HELPER} failed to spawn: {e}"))
            }
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ScrapeError::Temporary(format!(
            "{PUBMED_HELPER} exited with {}: {stderr}",
            output.status
        )));
    }
    parse_helper_output(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_helper_output(stdout: &str) -> ScrapeResult {
    let lines: Vec<&str> = stdout.lines().collect();
    if lines.len() < 5 {
        return Err(ScrapeError::Permanent(format!(
            "{PUBMED_HELPER} produced {} lines, expected 5",
            lines.len()
        )));
    }
    Ok(Item {
        title: lines[0].trim().to_string(),
        author: normalize_authors(lines[1].trim()),
        date: lines[2].trim().chars().take(10).collect(),
        doi: lines[3].trim().to_string(),
        tags: Vec::new(),
        abstract_html: clean_abstract(&lines[4..].join("\n")),
    })
}
