//! Malformed-footnote detection.
//!
//! A footnote whose whole body is one short unspaced run is a citation
//! anchor the author typed into the note text instead of the link; it would
//! render as a cryptic one-word popup. The build stops and names it.

use super::PassError;
use crate::{
    ast::{Block, Doc, Inline, blocks_text},
    config::MALFORMED_NOTE_MAX,
};

pub fn check(doc: &Doc) -> Result<(), PassError> {
    check_blocks(&doc.blocks)
}

fn check_blocks(blocks: &[Block]) -> Result<(), PassError> {
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Paragraph(inlines) => check_inlines(inlines)?,
            Block::Heading { content, .. } => check_inlines(content)?,
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => check_blocks(inner)?,
            Block::List { items, .. } => {
                for item in items {
                    check_blocks(item)?;
                }
            }
            Block::CodeBlock { .. } | Block::Rule | Block::RawHtml(_) => {}
        }
    }
    Ok(())
}

fn check_inlines(inlines: &[Inline]) -> Result<(), PassError> {
    for inline in inlines {
        match inline {
            Inline::Note(blocks) => {
                let text = blocks_text(blocks);
                let text = text.trim();
                if !text.is_empty() && text.len() <= MALFORMED_NOTE_MAX && !text.contains(' ') {
                    return Err(PassError::MalformedNote(text.to_string()));
                }
                check_blocks(blocks)?;
            }
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => check_inlines(inner)?,
            Inline::Link(link) => check_inlines(&link.content)?,
            _ => {}
        }
    }
    Ok(())
}
