//! Header self-links.
//!
//! Every heading ends up with a non-empty id free of `.`, `#`, `:` and its
//! visible children replaced by a single link to its own anchor, title-cased,
//! with a tooltip naming the section. An author-supplied id carrying a
//! forbidden character is the author's to fix: the build stops and names it.

use std::collections::HashMap;

use super::PassError;
use crate::{
    ast::{Attr, Block, Doc, Inline, Link, inlines_text},
    utils::{slugify, title_case},
};

const FORBIDDEN: &[char] = &['.', '#', ':'];

pub fn run(doc: &mut Doc) -> Result<(), PassError> {
    let mut slug_counts: HashMap<String, usize> = HashMap::new();
    rewrite(&mut doc.blocks, &mut slug_counts)
}

fn rewrite(blocks: &mut [Block], slug_counts: &mut HashMap<String, usize>) -> Result<(), PassError> {
    for block in blocks {
        match block {
            Block::Heading { attr, content, .. } => {
                self_link(attr, content, slug_counts)?;
            }
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                rewrite(inner, slug_counts)?;
            }
            Block::List { items, .. } => {
                for item in items {
                    rewrite(item, slug_counts)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn self_link(
    attr: &mut Attr,
    content: &mut Vec<Inline>,
    slug_counts: &mut HashMap<String, usize>,
) -> Result<(), PassError> {
    if attr.id.contains(FORBIDDEN) {
        return Err(PassError::ForbiddenHeadingId(attr.id.clone()));
    }

    let plain = inlines_text(content).trim().to_string();
    if attr.id.is_empty() {
        attr.id = uniquify(slugify(&plain), slug_counts);
    }
    if attr.id.is_empty() {
        return Err(PassError::EmptyHeadingId(plain));
    }

    let mut titled = content.clone();
    title_case_inlines(&mut titled);

    let mut link_attr = Attr::default();
    link_attr.add_class("section-self-link");
    *content = vec![Inline::Link(Link {
        attr: link_attr,
        url: format!("#{}", attr.id),
        title: format!("Link to section: \u{00A7} '{plain}'"),
        content: titled,
    })];
    Ok(())
}

fn title_case_inlines(inlines: &mut [Inline]) {
    for inline in inlines {
        match inline {
            Inline::Str(text) => *text = title_case(text),
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => title_case_inlines(inner),
            Inline::Link(link) => title_case_inlines(&mut link.content),
            _ => {}
        }
    }
}

fn uniquify(base: String, slug_counts: &mut HashMap<String, usize>) -> String {
    if base.is_empty() {
        return base;
    }
    let n = slug_counts.entry(base.clone()).or_insert(0);
    *n += 1;
    if *n == 1 { base } else { format!("{base}-{n}") }
}

#[cfg(test)]
mod tests;
