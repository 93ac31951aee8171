//! Near-monochrome image detection for dark-mode inversion.
//!
//! Mean lightness (HSL L) below the threshold marks an image
//! `invertible-auto`. Verdicts are memoized per source path for the build;
//! remote images are fetched to a temp file at most once. No cross-build
//! persistence: a stale verdict would silently mis-style images.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    process::Command,
    sync::Mutex,
};

use sha1::{Digest, Sha1};
use tracing::warn;

use super::PassCtx;
use crate::ast::Doc;
use crate::config::{
    BuildOptions, HTTP_TIMEOUT, INVERT_LIGHTNESS_THRESHOLD, PREVIEW_HELPER, USER_AGENT,
};

pub const INVERTIBLE_CLASS: &str = "invertible-auto";
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

pub struct InvertCache {
    root: PathBuf,
    no_preview: bool,
    memo: Mutex<HashMap<String, Option<bool>>>,
    http: reqwest::blocking::Client,
}

impl InvertCache {
    pub fn new(root: &Path, options: &BuildOptions) -> color_eyre::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            root: root.to_path_buf(),
            no_preview: options.no_preview,
            memo: Mutex::new(HashMap::new()),
            http,
        })
    }

    /// Verdict for a URL that may be local or remote. `None` means the
    /// image could not be read; no class is added.
    pub fn is_invertible(&self, url: &str) -> Option<bool> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.remote_is_invertible(url)
        } else {
            self.local_is_invertible(url)
        }
    }

    pub fn local_is_invertible(&self, url: &str) -> Option<bool> {
        let path = self.root.join(url.trim_start_matches('/'));
        self.memoized(url, || mean_lightness_of_file(&path))
    }

    pub fn remote_is_invertible(&self, url: &str) -> Option<bool> {
        self.memoized(url, || {
            let response = self.http.get(url).send().ok()?;
            if !response.status().is_success() {
                return None;
            }
            let bytes = response.bytes().ok()?;
            // One temp copy per URL per build; the memo prevents refetching.
            let digest = Sha1::digest(url.as_bytes());
            let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
            let tmp = std::env::temp_dir().join(format!("apparatus-img-{name}"));
            fs::write(&tmp, &bytes).ok()?;
            mean_lightness_of_file(&tmp)
        })
    }

    fn memoized(&self, key: &str, compute: impl FnOnce() -> Option<f32>) -> Option<bool> {
        if let Some(cached) = self.memo.lock().expect("invert memo poisoned").get(key) {
            return *cached;
        }
        let verdict = compute().map(|lightness| lightness < INVERT_LIGHTNESS_THRESHOLD);
        self.memo
            .lock()
            .expect("invert memo poisoned")
            .insert(key.to_string(), verdict);
        if verdict == Some(true) {
            self.review(key);
        }
        verdict
    }

    /// A fresh inversion verdict is worth a human glance; a false positive
    /// renders the image as a photographic negative in dark mode.
    fn review(&self, url: &str) {
        warn!(url, "newly classified as invertible");
        if !self.no_preview {
            let target = if url.starts_with("http") {
                url.to_string()
            } else {
                self.root.join(url.trim_start_matches('/')).display().to_string()
            };
            let _ = Command::new(PREVIEW_HELPER).arg(target).spawn();
        }
    }
}

pub fn run(doc: &mut Doc, ctx: &PassCtx<'_>) {
    doc.walk_images_mut(&mut |image| {
        if has_image_extension(&image.url) && ctx.invert.is_invertible(&image.url) == Some(true) {
            image.attr.add_class(INVERTIBLE_CLASS);
        }
    });
    doc.walk_links_mut(&mut |link| {
        if has_image_extension(&link.url) && ctx.invert.is_invertible(&link.url) == Some(true) {
            link.attr.add_class(INVERTIBLE_CLASS);
        }
    });
}

fn has_image_extension(url: &str) -> bool {
    let path = url.split(['#', '?']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn mean_lightness_of_file(path: &Path) -> Option<f32> {
    let decoded = image::open(path).ok()?;
    Some(mean_lightness(&decoded.to_rgb8()))
}

/// Mean of per-pixel HSL lightness: ((max + min) / 2) / 255.
pub fn mean_lightness(rgb: &image::RgbImage) -> f32 {
    let pixels = rgb.pixels().len();
    if pixels == 0 {
        return 1.0;
    }
    let sum: f64 = rgb
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            let max = r.max(g).max(b) as f64;
            let min = r.min(g).min(b) as f64;
            (max + min) / 2.0 / 255.0
        })
        .sum();
    (sum / pixels as f64) as f32
}

#[cfg(test)]
mod tests;
