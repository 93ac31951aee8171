//! Local snapshots of external links.
//!
//! Every external URL a document cites gets snapshotted to
//! `doc/www/<domain>/<sha1(url-without-fragment)>.<ext>` (`html` via a
//! headless single-file snapshot, `pdf` via direct download), and the store
//! remembers one of four states per URL. The store is linearizable: one
//! writer, one in-flight fetch per URL, atomic rewrite of the store file.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::{info, warn};

use crate::{
    config::{ARCHIVE_DB, ARCHIVE_DIR, BuildOptions, HTTP_TIMEOUT, PREVIEW_HELPER, SNAPSHOT_HELPER,
        SNAPSHOT_TIMEOUT, USER_AGENT},
    utils::{domain_of, write_then_rename},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveState {
    /// Never attempted.
    PendingNever,
    /// Attempted and failed temporarily; retry after the recorded time.
    PendingRetry { last_attempt: i64 },
    Succeeded,
    PermanentFailure,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ArchiveRecord {
    url: String,
    state: ArchiveState,
    local_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("permanent archive failure for {url}: {reason}")]
    Permanent { url: String, reason: String },
    #[error("temporary archive failure for {url}: {reason}")]
    Temporary { url: String, reason: String },
}

/// Body strings that mean the "snapshot" is an error page.
const ERROR_PAGE_MARKERS: &[&str] = &[
    "403 Forbidden",
    "404 Not Found",
    "Download Limit Exceeded",
    "Access Denied",
    "Instance has been rate limited",
];

pub struct Archive {
    root: PathBuf,
    db_path: PathBuf,
    options: BuildOptions,
    records: DashMap<String, (ArchiveState, String)>,
    /// One in-flight fetch per URL; a second caller waits on the same lock
    /// and then observes the recorded result.
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    new_snapshots: AtomicUsize,
    http: reqwest::blocking::Client,
}

impl Archive {
    pub fn load(root: &Path, options: &BuildOptions) -> color_eyre::Result<Self> {
        let db_path = root.join(ARCHIVE_DB);
        let records = DashMap::new();
        if db_path.exists() {
            let raw = fs::read_to_string(&db_path)?;
            let list: Vec<ArchiveRecord> = serde_json::from_str(&raw)?;
            for record in list {
                records.insert(record.url, (record.state, record.local_path));
            }
        }
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            root: root.to_path_buf(),
            db_path,
            options: options.clone(),
            records,
            in_flight: DashMap::new(),
            new_snapshots: AtomicUsize::new(0),
            http,
        })
    }

    /// Serialize the store back to disk, sorted, via temp file + rename.
    pub fn save(&self) -> std::io::Result<()> {
        let mut list: Vec<ArchiveRecord> = self
            .records
            .iter()
            .map(|entry| ArchiveRecord {
                url: entry.key().clone(),
                state: entry.value().0.clone(),
                local_path: entry.value().1.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.url.cmp(&b.url));
        let json = serde_json::to_string_pretty(&list)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        write_then_rename(&self.db_path, json.as_bytes())
    }

    pub fn state_of(&self, url: &str) -> Option<ArchiveState> {
        self.records.get(strip_fragment(url)).map(|e| e.value().0.clone())
    }

    /// The snapshot contract: return the local path for `url`, fetching if
    /// needed. The original fragment is re-attached to the returned path.
    pub fn resolve(&self, url: &str) -> Result<String, ArchiveError> {
        let (bare, fragment) = split_fragment(url);
        let with_fragment = |path: &str| match fragment {
            Some(frag) => format!("{path}#{frag}"),
            None => path.to_string(),
        };

        // Fast path: already on disk from this or an earlier build.
        if let Some(existing) = self.existing_snapshot(bare) {
            self.records.insert(
                bare.to_string(),
                (ArchiveState::Succeeded, existing.clone()),
            );
            return Ok(with_fragment(&existing));
        }

        if let Some((ArchiveState::PermanentFailure, _)) =
            self.records.get(bare).map(|e| e.value().clone())
        {
            return Err(ArchiveError::Permanent {
                url: bare.to_string(),
                reason: "recorded permanent failure".to_string(),
            });
        }

        if self.options.check {
            return Err(ArchiveError::Temporary {
                url: bare.to_string(),
                reason: "check mode: not fetching".to_string(),
            });
        }

        if let Some(cap) = self.options.archive_cap
            && self.new_snapshots.load(Ordering::SeqCst) >= cap
        {
            return Err(ArchiveError::Temporary {
                url: bare.to_string(),
                reason: "per-build archive cap reached".to_string(),
            });
        }

        // One fetch per URL: the second caller blocks here, then re-checks.
        let gate = self
            .in_flight
            .entry(bare.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = gate.lock().expect("in-flight lock poisoned");

        if let Some(existing) = self.existing_snapshot(bare) {
            return Ok(with_fragment(&existing));
        }
        match self.records.get(bare).map(|e| e.value().clone()) {
            Some((ArchiveState::Succeeded, path)) if !path.is_empty() => {
                return Ok(with_fragment(&path));
            }
            Some((ArchiveState::PermanentFailure, _)) => {
                return Err(ArchiveError::Permanent {
                    url: bare.to_string(),
                    reason: "recorded permanent failure".to_string(),
                });
            }
            _ => {}
        }

        let result = self.fetch(bare);
        match &result {
            Ok(path) => {
                self.new_snapshots.fetch_add(1, Ordering::SeqCst);
                self.records
                    .insert(bare.to_string(), (ArchiveState::Succeeded, path.clone()));
            }
            Err(ArchiveError::Permanent { .. }) => {
                self.records.insert(
                    bare.to_string(),
                    (ArchiveState::PermanentFailure, String::new()),
                );
            }
            Err(ArchiveError::Temporary { .. }) => {
                self.records.insert(
                    bare.to_string(),
                    (
                        ArchiveState::PendingRetry {
                            last_attempt: unix_now(),
                        },
                        String::new(),
                    ),
                );
            }
        }
        result.map(|path| with_fragment(&path))
    }

    /// The expected snapshot path if one already exists on disk.
    fn existing_snapshot(&self, bare_url: &str) -> Option<String> {
        let (domain, hash) = snapshot_key(bare_url)?;
        for ext in ["html", "pdf"] {
            let rel = format!("{ARCHIVE_DIR}/{domain}/{hash}.{ext}");
            if self.root.join(&rel).is_file() {
                return Some(format!("/{rel}"));
            }
        }
        None
    }

    fn fetch(&self, bare_url: &str) -> Result<String, ArchiveError> {
        let permanent = |reason: String| ArchiveError::Permanent {
            url: bare_url.to_string(),
            reason,
        };
        let temporary = |reason: String| ArchiveError::Temporary {
            url: bare_url.to_string(),
            reason,
        };

        let (domain, hash) =
            snapshot_key(bare_url).ok_or_else(|| permanent("unparseable url".to_string()))?;

        // arXiv requires robots-compliant mirrors to use the export host.
        let fetch_url = bare_url.replace("://arxiv.org/", "://export.arxiv.org/");

        // Full GET, not HEAD: enough hosts lie on HEAD that it is useless.
        let response = self
            .http
            .get(&fetch_url)
            .send()
            .map_err(|e| temporary(format!("probe failed: {e}")))?;
        let status = response.status();
        if status.as_u16() == 403 || status.as_u16() == 404 {
            return Err(permanent(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(temporary(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let looks_like_pdf_url = bare_url.to_ascii_lowercase().ends_with(".pdf");

        let rel = if content_type.contains("application/pdf") || looks_like_pdf_url {
            let bytes = response
                .bytes()
                .map_err(|e| temporary(format!("download failed: {e}")))?;
            if !bytes.starts_with(b"%PDF") {
                return Err(permanent("downloaded file is not a PDF".to_string()));
            }
            let rel = format!("{ARCHIVE_DIR}/{domain}/{hash}.pdf");
            write_then_rename(&self.root.join(&rel), &bytes)
                .map_err(|e| temporary(format!("write failed: {e}")))?;
            info!(url = bare_url, path = %rel, "archived pdf (compression deferred)");
            rel
        } else {
            let body = response
                .text()
                .map_err(|e| temporary(format!("read failed: {e}")))?;
            let rel = format!("{ARCHIVE_DIR}/{domain}/{hash}.html");
            self.snapshot_page(&fetch_url, &body, &self.root.join(&rel))?;
            rel
        };

        self.maybe_preview(bare_url, &rel);
        Ok(format!("/{rel}"))
    }

    /// Headless single-file snapshot. Scripts are stripped except on hosts
    /// known to render blank without them.
    fn snapshot_page(
        &self,
        fetch_url: &str,
        raw_body: &str,
        out_path: &Path,
    ) -> Result<(), ArchiveError> {
        let temporary = |reason: String| ArchiveError::Temporary {
            url: fetch_url.to_string(),
            reason,
        };
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| temporary(e.to_string()))?;
        }

        let keep_scripts = raw_body.contains("substackcdn.com") || raw_body.contains("substack.com");
        let mut command = Command::new(SNAPSHOT_HELPER);
        command
            .arg("--compress-CSS=true")
            .arg(format!("--remove-scripts={}", !keep_scripts))
            .arg("--load-deferred-images-max-idle-time=4000")
            .arg("--browser-wait-until=networkIdle")
            .arg(format!(
                "--browser-load-max-time={}",
                SNAPSHOT_TIMEOUT.as_millis()
            ))
            .arg(fetch_url)
            .arg(out_path);

        let output = command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                temporary(format!("{SNAPSHOT_HELPER} is not installed"))
            } else {
                temporary(format!("{SNAPSHOT_HELPER} failed to spawn: {e}"))
            }
        })?;
        if !output.status.success() {
            return Err(temporary(format!(
                "{SNAPSHOT_HELPER} exited with {}",
                output.status
            )));
        }

        let snapshot = fs::read_to_string(out_path).map_err(|e| temporary(e.to_string()))?;
        if let Some(marker) = ERROR_PAGE_MARKERS.iter().find(|m| snapshot.contains(**m)) {
            let _ = fs::remove_file(out_path);
            return Err(ArchiveError::Permanent {
                url: fetch_url.to_string(),
                reason: format!("snapshot is an error page ({marker})"),
            });
        }
        Ok(())
    }

    /// Open snapshot and original side by side for a human spot check.
    fn maybe_preview(&self, original: &str, rel: &str) {
        if self.options.no_preview {
            return;
        }
        warn!(url = original, snapshot = rel, "new snapshot; opening for review");
        let _ = Command::new(PREVIEW_HELPER)
            .arg(self.root.join(rel))
            .spawn();
        let _ = Command::new(PREVIEW_HELPER).arg(original).spawn();
    }
}

fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(bare, _)| bare)
}

fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((bare, frag)) => (bare, Some(frag)),
        None => (url, None),
    }
}

/// `(domain, sha1-hex)` for the fragmentless URL.
pub fn snapshot_key(bare_url: &str) -> Option<(String, String)> {
    let domain = domain_of(bare_url)?;
    let digest = Sha1::digest(bare_url.as_bytes());
    let hash: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    Some((domain, hash))
}

#[cfg(test)]
mod tests;
