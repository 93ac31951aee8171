//! Has-annotation marking.
//!
//! A link whose target carries a usable annotation gets the `docMetadata`
//! class (the popup hook) and a freshly generated citation id. Wikipedia
//! links are marked unconditionally; their popups are materialized
//! client-side. Targets with short abstracts are left alone: the plain
//! tooltip is enough.

use std::sync::LazyLock;

use regex::Regex;

use super::PassCtx;
use crate::{
    ast::{Block, Doc, Inline, Link},
    config::MIN_ABSTRACT_LEN,
    ident::generate_id,
    metadata::Metadata,
};

/// Authors opt a link out of annotation with this class.
pub const OPT_OUT_CLASS: &str = "no-annotation";
pub const ANNOTATED_CLASS: &str = "docMetadata";

pub fn run(doc: &mut Doc, ctx: &PassCtx<'_>) {
    doc.walk_links_mut(&mut |link| decorate_link(link, ctx.meta));
}

fn decorate_link(link: &mut Link, meta: &Metadata) {
    if link.attr.has_class(OPT_OUT_CLASS) {
        return;
    }
    if link.url.contains("wikipedia.org/wiki/") {
        link.attr.add_class(ANNOTATED_CLASS);
        return;
    }
    let Some(item) = meta.lookup(&link.url) else {
        return;
    };
    if item.is_negative() || item.abstract_html.len() < MIN_ABSTRACT_LEN {
        return;
    }
    link.attr.add_class(ANNOTATED_CLASS);
    if link.attr.id.is_empty() {
        let id = generate_id(&link.url, &item.author, &item.date);
        if !id.is_empty() {
            link.attr.id = id;
        }
    }
}

/// Collect every link target in a document, for the scrape phase.
pub fn collect_link_targets(doc: &Doc) -> Vec<String> {
    let mut targets = Vec::new();
    collect_blocks(&doc.blocks, &mut targets);
    targets
}

fn collect_blocks(blocks: &[Block], targets: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Paragraph(inlines) => collect_inlines(inlines, targets),
            Block::Heading { content, .. } => collect_inlines(content, targets),
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                collect_blocks(inner, targets);
            }
            Block::List { items, .. } => {
                for item in items {
                    collect_blocks(item, targets);
                }
            }
            Block::CodeBlock { .. } | Block::Rule | Block::RawHtml(_) => {}
        }
    }
}

fn collect_inlines(inlines: &[Inline], targets: &mut Vec<String>) {
    for inline in inlines {
        match inline {
            Inline::Link(link) => {
                targets.push(link.url.clone());
                collect_inlines(&link.content, targets);
            }
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => collect_inlines(inner, targets),
            Inline::Image(image) => collect_inlines(&image.alt, targets),
            Inline::Note(blocks) => collect_blocks(blocks, targets),
            _ => {}
        }
    }
}

static PLAIN_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]*)">"#).expect("static pattern"));

/// The annotation-injection pass for HTML fragments (abstracts). Cleaned
/// abstracts only ever contain plain `<a href="…">` anchors, so decoration
/// is an attribute rewrite; already-decorated anchors no longer match.
pub fn decorate_anchors_html(html: &str, meta: &Metadata) -> String {
    PLAIN_ANCHOR
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let href = &caps[1];
            let Some(item) = meta.lookup(href) else {
                return caps[0].to_string();
            };
            if item.is_negative() || item.abstract_html.len() < MIN_ABSTRACT_LEN {
                return caps[0].to_string();
            }
            let id = generate_id(href, &item.author, &item.date);
            let id_attr = if id.is_empty() {
                String::new()
            } else {
                format!(" id=\"{id}\"")
            };
            format!("<a class=\"{ANNOTATED_CLASS}\"{id_attr} href=\"{href}\">")
        })
        .into_owned()
}

#[cfg(test)]
mod tests;
