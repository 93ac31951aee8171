//! Shared data types for the annotation pipeline.
//! Implemented as newtypes to enforce invariants.

use std::fmt;

use time::{Date, format_description};

use crate::config::SITE_BASE_URL;

/// Canonical identifier of a linked resource.
///
/// Canonicalization strips the site's own absolute prefix down to a leading
/// `/` and removes a leading `./`. The fragment is kept for display but
/// excluded from the key used for store lookups and archive hashing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let stripped = if let Some(rest) = trimmed.strip_prefix(SITE_BASE_URL)
            && (rest.is_empty() || rest.starts_with(['/', '#', '?']))
        {
            if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{rest}")
            }
        } else if let Some(rest) = trimmed.strip_prefix("./") {
            rest.to_string()
        } else {
            trimmed.to_string()
        };
        Self(stripped)
    }

    /// The full path, fragment included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lookup key: everything before the first `#`.
    pub fn key(&self) -> &str {
        match self.0.split_once('#') {
            Some((before, _)) => before,
            None => &self.0,
        }
    }

    pub fn fragment(&self) -> Option<&str> {
        self.0.split_once('#').map(|(_, frag)| frag)
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Date format used throughout the metadata store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsoDate(Date);

impl IsoDate {
    pub fn parse(s: &str) -> Option<Self> {
        let fmt = format_description::parse("[year]-[month]-[day]").ok()?;
        Date::parse(s.trim(), &fmt).ok().map(Self)
    }

    pub fn as_str(&self) -> String {
        let fmt = format_description::parse("[year]-[month]-[day]")
            .expect("static date format string is valid");
        self.0.format(&fmt).unwrap_or_default()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// A slash-separated tag path, e.g. `statistics/peer-review`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.starts_with('/') || raw.ends_with('/') || raw.contains("//") {
            return None;
        }
        let valid = raw
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_' || ch == '/');
        if valid { Some(Self(raw.to_string())) } else { None }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The individual path segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests;
