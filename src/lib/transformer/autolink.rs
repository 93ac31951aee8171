//! Auto-linking of known phrases.
//!
//! The phrase table is data (`metadata/auto-link.yaml`, ordered
//! `[phrase, url]` pairs). Only the first occurrence of a phrase in a
//! document is linked; matches inside existing links, headings, and code
//! are skipped.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use color_eyre::eyre::WrapErr;
use tracing::info;

use super::PassCtx;
use crate::{
    ast::{Attr, Block, Doc, Inline, Link},
    config::AUTOLINK_YAML,
};

pub struct AutoLinker {
    matcher: Option<AhoCorasick>,
    targets: Vec<(String, String)>,
}

impl AutoLinker {
    pub fn empty() -> Self {
        Self {
            matcher: None,
            targets: Vec::new(),
        }
    }

    pub fn load(root: &Path) -> color_eyre::Result<Self> {
        let path = root.join(AUTOLINK_YAML);
        if !path.exists() {
            return Ok(Self::empty());
        }
        let raw = fs::read_to_string(&path)?;
        let pairs: Vec<(String, String)> = serde_yaml::from_str(&raw)
            .wrap_err_with(|| format!("malformed auto-link rules: {}", path.display()))?;
        info!(rules = pairs.len(), "auto-link table loaded");
        Self::from_pairs(pairs)
    }

    pub fn from_pairs(pairs: Vec<(String, String)>) -> color_eyre::Result<Self> {
        if pairs.is_empty() {
            return Ok(Self::empty());
        }
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(pairs.iter().map(|(phrase, _)| phrase))?;
        Ok(Self {
            matcher: Some(matcher),
            targets: pairs,
        })
    }
}

pub fn run(doc: &mut Doc, ctx: &PassCtx<'_>) {
    let Some(matcher) = &ctx.autolinker.matcher else {
        return;
    };
    let mut used: HashSet<usize> = HashSet::new();
    link_blocks(&mut doc.blocks, matcher, &ctx.autolinker.targets, &mut used);
}

fn link_blocks(
    blocks: &mut [Block],
    matcher: &AhoCorasick,
    targets: &[(String, String)],
    used: &mut HashSet<usize>,
) {
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Paragraph(inlines) => {
                link_inlines(inlines, matcher, targets, used);
            }
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                link_blocks(inner, matcher, targets, used);
            }
            Block::List { items, .. } => {
                for item in items {
                    link_blocks(item, matcher, targets, used);
                }
            }
            // Headings self-link later; code never auto-links.
            Block::Heading { .. } | Block::CodeBlock { .. } | Block::Rule | Block::RawHtml(_) => {}
        }
    }
}

fn link_inlines(
    inlines: &mut Vec<Inline>,
    matcher: &AhoCorasick,
    targets: &[(String, String)],
    used: &mut HashSet<usize>,
) {
    let mut i = 0;
    while i < inlines.len() {
        match &mut inlines[i] {
            Inline::Str(text) => {
                if let Some(replacement) = link_str(text, matcher, targets, used) {
                    let advance = replacement.len();
                    inlines.splice(i..=i, replacement);
                    i += advance;
                } else {
                    i += 1;
                }
            }
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => {
                link_inlines(inner, matcher, targets, used);
                i += 1;
            }
            Inline::Note(blocks) => {
                link_blocks(blocks, matcher, targets, used);
                i += 1;
            }
            // Never link inside an existing link or an image alt.
            _ => i += 1,
        }
    }
}

fn link_str(
    text: &str,
    matcher: &AhoCorasick,
    targets: &[(String, String)],
    used: &mut HashSet<usize>,
) -> Option<Vec<Inline>> {
    let mut out: Vec<Inline> = Vec::new();
    let mut last = 0;

    for m in matcher.find_iter(text) {
        let pattern = m.pattern().as_usize();
        if used.contains(&pattern) || !on_word_boundary(text, m.start(), m.end()) {
            continue;
        }
        used.insert(pattern);

        if m.start() > last {
            out.push(Inline::Str(text[last..m.start()].to_string()));
        }
        let mut attr = Attr::default();
        attr.add_class("link-auto");
        out.push(Inline::Link(Link {
            attr,
            url: targets[pattern].1.clone(),
            title: String::new(),
            content: vec![Inline::Str(text[m.start()..m.end()].to_string())],
        }));
        last = m.end();
    }

    if last == 0 {
        return None;
    }
    if last < text.len() {
        out.push(Inline::Str(text[last..].to_string()));
    }
    Some(out)
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|ch| !ch.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|ch| !ch.is_alphanumeric());
    before_ok && after_ok
}
