//! Link rewrites against site state: snapshot substitution, local-link
//! classification, and page-metadata propagation.

use tracing::{debug, warn};

use super::PassCtx;
use crate::{
    archive::ArchiveError,
    ast::{Doc, Link},
    types::CanonicalPath,
};

/// Domains that are never snapshotted: our own mirrors live elsewhere or
/// the client handles them directly.
const NO_ARCHIVE_DOMAINS: &[&str] = &["wikipedia.org", "gwern.net", "doi.org", "localhost"];

/// Replace every archivable external link with its local snapshot,
/// remembering the original in `data-url-original`. Failures leave the
/// link pointing at the live URL.
pub fn archive_links(doc: &mut Doc, ctx: &PassCtx<'_>) {
    doc.walk_links_mut(&mut |link| {
        if !link.url.starts_with("http") || is_unarchivable(&link.url) {
            return;
        }
        match ctx.archive.resolve(&link.url) {
            Ok(local) => {
                link.attr.set_kv("data-url-original", &link.url);
                link.url = local;
            }
            Err(ArchiveError::Temporary { url, reason }) => {
                debug!(%url, %reason, "snapshot unavailable this build");
            }
            Err(ArchiveError::Permanent { url, reason }) => {
                warn!(%url, %reason, "link cannot be archived");
            }
        }
    });
}

fn is_unarchivable(url: &str) -> bool {
    let Some(domain) = crate::utils::domain_of(url) else {
        return true;
    };
    NO_ARCHIVE_DOMAINS
        .iter()
        .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
}

/// Mark site-internal page links (no file extension, not static assets)
/// for styling.
pub fn classify_local(doc: &mut Doc) {
    doc.walk_links_mut(&mut |link| {
        if is_local_page(&link.url) {
            link.attr.add_class("link-local");
        }
    });
}

fn is_local_page(url: &str) -> bool {
    if !url.starts_with('/') {
        return false;
    }
    if url.starts_with("/static/") || url.starts_with("/images/") {
        return false;
    }
    let path = url.split(['#', '?']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    !last.contains('.')
}

/// Propagate page-level metadata (backlinks, tags) onto links pointing at
/// pages of this site, so the client can decide what a popup offers.
pub fn page_links(doc: &mut Doc, ctx: &PassCtx<'_>) {
    doc.walk_links_mut(&mut |link: &mut Link| {
        let key = CanonicalPath::new(&link.url).key().to_string();
        let Some(info) = ctx.pages.get(&key) else {
            return;
        };
        link.attr.add_class("link-page");
        if info.inbound > 0 {
            link.attr.add_class("has-backlinks");
        }
        if !info.tags.is_empty() {
            link.attr.set_kv("data-page-tags", &info.tags.join(", "));
        }
    });
}
