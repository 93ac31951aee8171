//! The annotation store: an in-memory map from canonical path to item,
//! backed by two YAML files.
//!
//! The curated file is hand-edited and authoritative; it must pass strict
//! invariants or the build aborts naming the offending record. The auto file
//! is an append-only log of scraper output, compacted on load. On merge the
//! curated side wins.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
    sync::Mutex,
};

use color_eyre::{Section, eyre::WrapErr};
use tracing::info;

use crate::{
    config::{AUTO_YAML, CURATED_YAML},
    types::CanonicalPath,
};

/// On-disk record shape shared by both YAML files:
/// `[url, title, author, date, doi, abstract]`.
pub type Record = (String, String, String, String, String, String);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item {
    pub title: String,
    pub author: String,
    pub date: String,
    pub doi: String,
    pub tags: Vec<String>,
    pub abstract_html: String,
}

impl Item {
    /// A negative cache entry: we tried this URL, nothing is available.
    pub fn negative() -> Self {
        Self::default()
    }

    pub fn is_negative(&self) -> bool {
        self.title.is_empty() && self.author.is_empty() && self.abstract_html.is_empty()
    }

    fn from_record(record: &Record) -> (String, Self) {
        let (url, title, author, date, doi, abstract_html) = record;
        let item = Self {
            title: title.clone(),
            author: author.clone(),
            date: date.clone(),
            doi: doi.clone(),
            tags: tags_for_path(url),
            abstract_html: abstract_html.clone(),
        };
        (url.clone(), item)
    }

    fn to_record(&self, url: &str) -> Record {
        (
            url.to_string(),
            self.title.clone(),
            self.author.clone(),
            self.date.clone(),
            self.doi.clone(),
            self.abstract_html.clone(),
        )
    }
}

/// Tags are derived from the document-archive layout: a local path
/// `/doc/statistics/peer-review/1975-x.pdf` carries the tag path
/// `statistics/peer-review`.
pub fn tags_for_path(url: &str) -> Vec<String> {
    let Some(rest) = url.strip_prefix("/doc/") else {
        return Vec::new();
    };
    let dirs: Vec<&str> = rest.split('/').collect();
    if dirs.len() < 2 {
        return Vec::new();
    }
    vec![dirs[..dirs.len() - 1].join("/")]
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("duplicate url in curated metadata: {0}")]
    DuplicateUrl(String),
    #[error("duplicate title in curated metadata ({url_a} vs {url_b}): {title:?}")]
    DuplicateTitle {
        title: String,
        url_a: String,
        url_b: String,
    },
    #[error("duplicate abstract in curated metadata: {url_a} vs {url_b}")]
    DuplicateAbstract { url_a: String, url_b: String },
    #[error("empty mandatory field {field:?} in curated metadata for {url}")]
    EmptyField { field: &'static str, url: String },
    #[error("url contains whitespace: {0:?}")]
    UrlWhitespace(String),
    #[error("url must start with 'h', '/', or '?': {0:?}")]
    BadUrlPrefix(String),
}

#[derive(Debug)]
pub struct Metadata {
    map: BTreeMap<String, Item>,
    auto_path: PathBuf,
    append_lock: Mutex<()>,
}

impl Metadata {
    /// Load the curated file (required), invariant-check it, compact the
    /// auto file on disk, and union the two with the curated side winning.
    pub fn load(root: &Path) -> color_eyre::Result<Self> {
        let curated_path = root.join(CURATED_YAML);
        let curated_raw = fs::read_to_string(&curated_path)
            .wrap_err_with(|| format!("curated metadata is required: {}", curated_path.display()))?;
        let curated: Vec<Record> = serde_yaml::from_str(&curated_raw)
            .wrap_err("malformed curated metadata YAML")
            .with_note(|| curated_path.display().to_string())?;
        check_invariants(&curated)?;

        let auto_path = root.join(AUTO_YAML);
        let auto_records = compact_auto(&auto_path)?;

        let mut map = BTreeMap::new();
        for record in &auto_records {
            let (url, item) = Item::from_record(record);
            map.insert(CanonicalPath::new(&url).key().to_string(), item);
        }
        // Left-biased union: curated overrides anything scraped.
        for record in &curated {
            let (url, item) = Item::from_record(record);
            map.insert(CanonicalPath::new(&url).key().to_string(), item);
        }

        info!(
            curated = curated.len(),
            auto = auto_records.len(),
            total = map.len(),
            "metadata loaded"
        );

        Ok(Self {
            map,
            auto_path,
            append_lock: Mutex::new(()),
        })
    }

    /// Construct an empty in-memory store rooted at `root` (tests, tools).
    pub fn empty(root: &Path) -> Self {
        Self {
            map: BTreeMap::new(),
            auto_path: root.join(AUTO_YAML),
            append_lock: Mutex::new(()),
        }
    }

    pub fn lookup(&self, path: &str) -> Option<&Item> {
        self.map.get(CanonicalPath::new(path).key())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Item)> {
        self.map.iter()
    }

    /// Append one record to the auto log and refresh the in-memory map.
    /// Single-writer: concurrent scrape results are applied serially.
    pub fn append_auto(&mut self, url: &str, item: Item) -> io::Result<()> {
        let record = item.to_record(url);
        let fragment = serde_yaml::to_string(&vec![record])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        {
            let _guard = self.append_lock.lock().expect("append lock poisoned");
            if let Some(parent) = self.auto_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.auto_path)?;
            file.write_all(fragment.as_bytes())?;
        }
        self.map
            .insert(CanonicalPath::new(url).key().to_string(), item);
        Ok(())
    }

    /// One level of recursive inlining: rewrite each abstract with `decorate`
    /// (the annotation-injection pass) using the store itself. One level is
    /// enough; popups load further popups lazily, and full materialization
    /// would not terminate on cyclic annotation graphs.
    pub fn recurse_inline<F>(&mut self, decorate: F)
    where
        F: Fn(&str, &Self) -> String,
    {
        let updates: Vec<(String, String)> = self
            .map
            .iter()
            .filter(|(_, item)| !item.abstract_html.is_empty())
            .filter_map(|(key, item)| {
                let rewritten = decorate(&item.abstract_html, self);
                (rewritten != item.abstract_html).then(|| (key.clone(), rewritten))
            })
            .collect();
        for (key, html) in updates {
            if let Some(item) = self.map.get_mut(&key) {
                item.abstract_html = html;
            }
        }
    }
}

fn check_invariants(records: &[Record]) -> Result<(), MetadataError> {
    let mut urls: BTreeMap<&str, ()> = BTreeMap::new();
    let mut titles: BTreeMap<&str, &str> = BTreeMap::new();
    let mut abstracts: BTreeMap<&str, &str> = BTreeMap::new();

    for (url, title, author, _date, _doi, abstract_html) in records {
        if url.is_empty() {
            return Err(MetadataError::EmptyField {
                field: "url",
                url: url.clone(),
            });
        }
        if url.chars().any(char::is_whitespace) {
            return Err(MetadataError::UrlWhitespace(url.clone()));
        }
        if !url.starts_with(['h', '/', '?']) {
            return Err(MetadataError::BadUrlPrefix(url.clone()));
        }
        for (field, value) in [
            ("title", title),
            ("author", author),
            ("abstract", abstract_html),
        ] {
            if value.trim().is_empty() {
                return Err(MetadataError::EmptyField {
                    field,
                    url: url.clone(),
                });
            }
        }
        if urls.insert(url, ()).is_some() {
            return Err(MetadataError::DuplicateUrl(url.clone()));
        }
        if let Some(first) = titles.insert(title, url) {
            return Err(MetadataError::DuplicateTitle {
                title: title.clone(),
                url_a: first.to_string(),
                url_b: url.clone(),
            });
        }
        if let Some(first) = abstracts.insert(abstract_html, url) {
            return Err(MetadataError::DuplicateAbstract {
                url_a: first.to_string(),
                url_b: url.clone(),
            });
        }
    }
    Ok(())
}

/// Read the auto log, deduplicate through a map (last write wins), and
/// rewrite it in sorted order. A missing file is an empty log.
fn compact_auto(auto_path: &Path) -> color_eyre::Result<Vec<Record>> {
    if !auto_path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(auto_path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<Record> = serde_yaml::from_str(&raw)
        .wrap_err("malformed auto metadata YAML")
        .with_note(|| auto_path.display().to_string())?;

    let mut by_key: BTreeMap<String, Record> = BTreeMap::new();
    for record in records {
        by_key.insert(CanonicalPath::new(&record.0).key().to_string(), record);
    }
    let compacted: Vec<Record> = by_key.into_values().collect();

    let serialized = serde_yaml::to_string(&compacted)?;
    crate::utils::write_then_rename(auto_path, serialized.as_bytes())?;
    Ok(compacted)
}

#[cfg(test)]
mod tests;
