//! The document rewrite passes.
//!
//! A parsed document is decorated by [`rewrite_document`], which runs the
//! passes in a fixed order. The order is load-bearing; each pass notes what
//! it consumes from its predecessors:
//!
//! 1. auto-linker: before annotation so new links get decorated, and
//!    before typography so zero-width breaks cannot split a phrase match;
//! 2. interwiki shorthand resolution;
//! 3. malformed-footnote check (fails the build);
//! 4. (annotation *creation* is the driver's scrape phase, not a pass;
//!    the store is read-only from here on);
//! 5. has-annotation marking;
//! 6. inflation adjustment;
//! 7. external-link archiving: after annotation marking so lookups see the
//!    original URL;
//! 8. local-link classification: after archiving so snapshot paths, which
//!    carry extensions, are not misclassified;
//! 9. page-metadata propagation onto links;
//! 10. typography (slash/equals breaks, link-live, link-icon, rule cycling);
//! 11. header self-links and title-casing: after typography so heading
//!     text is final;
//! 12. image invertibility;
//! 13. loose-block promotion.

use std::collections::HashMap;

use crate::{
    archive::Archive,
    ast::{Block, Doc},
    config::BuildOptions,
    metadata::Metadata,
};

pub mod annotate;
pub mod autolink;
pub mod heading;
pub mod image;
pub mod inflation;
pub mod interwiki;
pub mod links;
pub mod notes;
pub mod typography;

use autolink::AutoLinker;
use image::InvertCache;

/// What the page-link walker knows about each page of the site.
#[derive(Clone, Debug, Default)]
pub struct PageInfo {
    pub title: String,
    pub tags: Vec<String>,
    pub inbound: usize,
}

/// Keyed by canonical fragmentless page path.
pub type PageIndex = HashMap<String, PageInfo>;

/// Everything a pass may consult. All stores are read-only here; the
/// archive does its own internal locking for fetches.
pub struct PassCtx<'a> {
    pub meta: &'a Metadata,
    pub archive: &'a Archive,
    pub pages: &'a PageIndex,
    pub autolinker: &'a AutoLinker,
    pub invert: &'a InvertCache,
    pub options: &'a BuildOptions,
}

/// Data errors the author must fix; they abort the build.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("footnote body looks like a bare citation anchor: {0:?}")]
    MalformedNote(String),
    #[error("heading id contains a forbidden character: {0:?}")]
    ForbiddenHeadingId(String),
    #[error("heading has no usable id after sanitization: {0:?}")]
    EmptyHeadingId(String),
}

pub fn rewrite_document(doc: &mut Doc, ctx: &PassCtx<'_>) -> Result<(), PassError> {
    autolink::run(doc, ctx);
    interwiki::run(doc);
    notes::check(doc)?;
    annotate::run(doc, ctx);
    inflation::run(doc);
    links::archive_links(doc, ctx);
    links::classify_local(doc);
    links::page_links(doc, ctx);
    typography::run(doc);
    heading::run(doc)?;
    image::run(doc, ctx);
    promote_loose_blocks(doc);
    Ok(())
}

/// A loose `Plain` at the top level is an artifact of parsing; readers want
/// a real paragraph.
fn promote_loose_blocks(doc: &mut Doc) {
    for block in &mut doc.blocks {
        if let Block::Plain(inlines) = block {
            *block = Block::Paragraph(std::mem::take(inlines));
        }
    }
}
