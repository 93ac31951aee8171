//! Typography decoration: line-break opportunities after slashes, spacing
//! around comparison operators, link-live and link-icon classification, and
//! the horizontal-rule cycler.

use crate::ast::{Attr, Block, Doc, Inline};
use crate::utils::map_html_text;

const ZWSP: char = '\u{200B}';
const HAIR_SPACE: char = '\u{200A}';

/// Domains whose pages permit iframe embedding, enabling live popups.
const LIVE_DOMAINS: &[&str] = &[
    "en.wikipedia.org",
    "developer.mozilla.org",
    "github.com",
    "arxiv.org",
    "gutenberg.org",
    "archive.org",
    "pubmed.ncbi.nlm.nih.gov",
];

/// Sprite selection: domain suffixes first, then file extensions.
const ICON_DOMAIN_RULES: &[(&str, &str)] = &[
    ("wikipedia.org", "wikipedia"),
    ("arxiv.org", "arxiv"),
    ("github.com", "github"),
    ("nytimes.com", "newspaper"),
    ("youtube.com", "video"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("reddit.com", "reddit"),
    ("biorxiv.org", "biorxiv"),
    ("medrxiv.org", "biorxiv"),
];

const ICON_EXTENSION_RULES: &[(&str, &str)] = &[
    (".pdf", "pdf"),
    (".txt", "text"),
    (".csv", "spreadsheet"),
    (".xlsx", "spreadsheet"),
    (".mp3", "audio"),
    (".webm", "video"),
    (".mp4", "video"),
];

pub fn run(doc: &mut Doc) {
    break_blocks(&mut doc.blocks, false);

    doc.walk_links_mut(&mut |link| {
        classify_live(&link.url, &mut link.attr);
        classify_icon(&link.url, &mut link.attr);
    });

    let mut counter = 0usize;
    cycle_rules(&mut doc.blocks, &mut counter);
}

fn break_blocks(blocks: &mut [Block], in_link: bool) {
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Paragraph(inlines) => break_inlines(inlines, in_link),
            Block::Heading { content, .. } => break_inlines(content, in_link),
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                break_blocks(inner, in_link);
            }
            Block::List { items, .. } => {
                for item in items {
                    break_blocks(item, in_link);
                }
            }
            Block::CodeBlock { .. } | Block::Rule | Block::RawHtml(_) => {}
        }
    }
}

fn break_inlines(inlines: &mut [Inline], in_link: bool) {
    for inline in inlines {
        match inline {
            Inline::Str(text) => {
                let broken = if in_link {
                    pad_link_slashes(text)
                } else {
                    break_slashes(text)
                };
                *text = break_equals(&broken);
            }
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => break_inlines(inner, in_link),
            Inline::Link(link) => break_inlines(&mut link.content, true),
            Inline::Note(blocks) => break_blocks(blocks, in_link),
            _ => {}
        }
    }
}

/// Insert a zero-width space after every `/` that is not already spaced and
/// not part of a `//` run, creating a line-break opportunity. Stripping the
/// zero-width spaces recovers the input exactly.
pub fn break_slashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);
    for (i, ch) in chars.iter().enumerate() {
        out.push(*ch);
        if *ch != '/' {
            continue;
        }
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();
        let breakable = prev.is_some_and(|p| !p.is_whitespace() && p != '/')
            && next.is_some_and(|n| !n.is_whitespace() && n != '/');
        if breakable {
            out.push(ZWSP);
        }
    }
    out
}

/// Inside link text an underlined slash collides with its neighbors; pad
/// with hair spaces in addition to the break opportunity.
pub fn pad_link_slashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    for (i, ch) in chars.iter().enumerate() {
        if *ch == '/' {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let padded = prev.is_some_and(|p| !p.is_whitespace() && p != '/')
                && next.is_some_and(|n| !n.is_whitespace() && n != '/');
            if padded {
                out.push(HAIR_SPACE);
                out.push('/');
                out.push(ZWSP);
                out.push(HAIR_SPACE);
                continue;
            }
        }
        out.push(*ch);
    }
    out
}

/// Space out `=`/`≠` jammed against an alphanumeric: `x=1` reads `x = 1`.
pub fn break_equals(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);
    for (i, ch) in chars.iter().enumerate() {
        if (*ch == '=' || *ch == '\u{2260}')
            && chars.get(i + 1).copied().is_some_and(|n| n.is_alphanumeric())
        {
            if !out.ends_with(char::is_whitespace) && !out.is_empty() {
                out.push(' ');
            }
            out.push(*ch);
            out.push(' ');
        } else {
            out.push(*ch);
        }
    }
    out
}

fn classify_live(url: &str, attr: &mut Attr) {
    let Some(domain) = crate::utils::domain_of(url) else {
        return;
    };
    if LIVE_DOMAINS
        .iter()
        .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
    {
        attr.add_class("link-live");
    }
}

fn classify_icon(url: &str, attr: &mut Attr) {
    if let Some(domain) = crate::utils::domain_of(url) {
        for (suffix, icon) in ICON_DOMAIN_RULES {
            if domain == *suffix || domain.ends_with(&format!(".{suffix}")) {
                attr.add_class(&format!("link-icon-{icon}"));
                return;
            }
        }
    }
    let path = url.split(['#', '?']).next().unwrap_or(url).to_ascii_lowercase();
    for (ext, icon) in ICON_EXTENSION_RULES {
        if path.ends_with(ext) {
            attr.add_class(&format!("link-icon-{icon}"));
            return;
        }
    }
}

/// Number horizontal rules 0,1,2,0,1,2,… in source order regardless of
/// nesting, wrapping each in a div whose class drives the alternating
/// decoration. The counter is threaded explicitly through the traversal.
pub fn cycle_rules(blocks: &mut [Block], counter: &mut usize) {
    for block in blocks {
        match block {
            Block::Rule => {
                let mut attr = Attr::default();
                attr.add_class(&format!("horizontalRule-nth-{}", *counter % 3));
                *counter += 1;
                *block = Block::Div {
                    attr,
                    content: vec![Block::Rule],
                };
            }
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                cycle_rules(inner, counter);
            }
            Block::List { items, .. } => {
                for item in items {
                    cycle_rules(item, counter);
                }
            }
            _ => {}
        }
    }
}

/// The string-level typography transform for HTML fragments (abstracts):
/// text segments get the same slash and equals treatment, tags are left
/// untouched.
pub fn decorate_html(html: &str) -> String {
    map_html_text(html, |text| break_equals(&break_slashes(text)))
}

#[cfg(test)]
mod tests;
