//! Annotation fragments: one standalone HTML file per usable annotation,
//! served as popup content.
//!
//! `metadata/annotation/<urlencoded-path>.html`, filename capped at 274
//! bytes. Each fragment is a synthetic mini-document (the citation link
//! line followed by the abstract in a blockquote) with the same annotation
//! and archive decoration nested links in the abstract would get in a page.
//! Writes are atomic and skipped when the content is unchanged.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rayon::prelude::*;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    archive::Archive,
    config::{ANNOTATION_DIR, FRAGMENT_FILENAME_MAX, MIN_ABSTRACT_LEN},
    ident::generate_id,
    metadata::{Item, Metadata},
    transformer::{annotate, typography},
    utils::{escape_attr, escape_text, write_if_changed},
};

/// Write every eligible fragment; returns how many files changed on disk.
pub fn write_fragments(
    meta: &Metadata,
    archive: &Archive,
    root: &Path,
) -> color_eyre::Result<usize> {
    let dir = root.join(ANNOTATION_DIR);
    std::fs::create_dir_all(&dir)?;

    let eligible: Vec<(&String, &Item)> = meta
        .iter()
        .filter(|(_, item)| !item.is_negative() && item.abstract_html.len() >= MIN_ABSTRACT_LEN)
        .collect();

    let results: Vec<std::io::Result<bool>> = eligible
        .par_iter()
        .map(|(path, item)| {
            let html = fragment_html(path, item, meta, archive);
            write_if_changed(&fragment_path(&dir, path), html.as_bytes())
        })
        .collect();

    let mut written = 0usize;
    for result in results {
        if result? {
            written += 1;
        }
    }
    info!(total = eligible.len(), written, "annotation fragments");
    Ok(written)
}

/// The on-disk filename for an annotation path, and whether truncation to
/// the filesystem cap altered it.
pub fn fragment_file_name(path: &str) -> (String, bool) {
    let encoded = utf8_percent_encode(path, NON_ALPHANUMERIC).to_string();
    let max_stem = FRAGMENT_FILENAME_MAX - ".html".len();
    if encoded.len() <= max_stem {
        return (format!("{encoded}.html"), false);
    }
    let mut stem = encoded[..max_stem].to_string();
    // Never cut a percent escape in half.
    while stem[stem.len().saturating_sub(2)..].contains('%') {
        stem.pop();
    }
    (format!("{stem}.html"), true)
}

fn fragment_path(dir: &Path, path: &str) -> PathBuf {
    let (name, truncated) = fragment_file_name(path);
    if truncated {
        warn!(path, file = %name, "fragment filename truncated");
    }
    dir.join(name)
}

static RELATIVE_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"href="#([^"]*)""##).expect("static pattern"));
static EXTERNAL_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(https?://[^"]*)""#).expect("static pattern"));

pub fn fragment_html(path: &str, item: &Item, meta: &Metadata, archive: &Archive) -> String {
    // Typography first, so the abstract gains the same break opportunities
    // a page body would have; then nested-link decoration.
    let decorated = typography::decorate_html(&item.abstract_html);
    let decorated = annotate::decorate_anchors_html(&decorated, meta);
    let decorated = absolutize_anchors(&decorated, path);
    let decorated = archive_anchors(&decorated, archive);

    let id = generate_id(path, &item.author, &item.date);
    let id_attr = if id.is_empty() {
        String::new()
    } else {
        format!(" id=\"{id}\"")
    };
    let date_part = if item.date.is_empty() {
        String::new()
    } else {
        format!(
            " (<span class=\"date\">{}</span>)",
            escape_text(&item.date)
        )
    };
    let doi_part = if item.doi.is_empty() {
        String::new()
    } else {
        format!(
            "; <a class=\"doi\" href=\"https://doi.org/{0}\">DOI</a>",
            escape_attr(&item.doi)
        )
    };

    format!(
        "<p><a class=\"docMetadata\"{id_attr} href=\"{url}\">{title}</a>, \
<span class=\"author\">{author}</span>{date_part}{doi_part}</p>\n\
<blockquote>\n{decorated}\n</blockquote>\n",
        url = escape_attr(path),
        title = escape_text(&item.title),
        author = escape_text(&item.author),
    )
}

/// Anchors relative to the annotated page (`href="#sec"`) must survive
/// being rendered inside some other page's popup.
fn absolutize_anchors(html: &str, path: &str) -> String {
    let bare = path.split_once('#').map_or(path, |(p, _)| p);
    RELATIVE_ANCHOR
        .replace_all(html, |caps: &regex::Captures<'_>| {
            format!("href=\"{bare}#{}\"", &caps[1])
        })
        .into_owned()
}

/// The archive pass for abstract HTML: external anchors point at local
/// snapshots where one exists or can be fetched; failures leave the live
/// link.
fn archive_anchors(html: &str, archive: &Archive) -> String {
    EXTERNAL_ANCHOR
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let url = &caps[1];
            match archive.resolve(url) {
                Ok(local) => format!("href=\"{local}\" data-url-original=\"{url}\""),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests;
