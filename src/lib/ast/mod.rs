//! Typed document tree.
//!
//! Every document is parsed once into this tree, mutated only by the rewrite
//! passes in their fixed order, and serialized to HTML once at the end. The
//! attribute triple (id, classes, key-values) lives on every linkable node so
//! passes can accumulate decoration without re-parsing anything.

pub mod html;
pub mod parse;

/// The (id, classes, key-value) attribute triple.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attr {
    pub id: String,
    pub classes: Vec<String>,
    pub kvs: Vec<(String, String)>,
}

impl Attr {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.classes.is_empty() && self.kvs.is_empty()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn set_kv(&mut self, key: &str, value: &str) {
        if let Some(existing) = self.kvs.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value.to_string();
        } else {
            self.kvs.push((key.to_string(), value.to_string()));
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub attr: Attr,
    pub url: String,
    pub title: String,
    pub content: Vec<Inline>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub attr: Attr,
    pub url: String,
    pub title: String,
    pub alt: Vec<Inline>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Str(String),
    Code(String),
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    Math { display: bool, src: String },
    Link(Link),
    Image(Image),
    RawHtml(String),
    SoftBreak,
    HardBreak,
    Note(Vec<Block>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Bare inline run (tight list items, stray top-level text).
    Plain(Vec<Inline>),
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        attr: Attr,
        content: Vec<Inline>,
    },
    BlockQuote(Vec<Block>),
    CodeBlock {
        lang: String,
        text: String,
    },
    List {
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    Rule,
    Div {
        attr: Attr,
        content: Vec<Block>,
    },
    RawHtml(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Doc {
    pub blocks: Vec<Block>,
}

impl Doc {
    /// Visit every inline node, depth-first in source order, including those
    /// inside footnote bodies.
    pub fn walk_inlines_mut(&mut self, f: &mut dyn FnMut(&mut Inline)) {
        walk_blocks_inlines(&mut self.blocks, f);
    }

    /// Visit every link in source order.
    pub fn walk_links_mut(&mut self, f: &mut dyn FnMut(&mut Link)) {
        self.walk_inlines_mut(&mut |inline| {
            if let Inline::Link(link) = inline {
                f(link);
            }
        });
    }

    /// Visit every image in source order.
    pub fn walk_images_mut(&mut self, f: &mut dyn FnMut(&mut Image)) {
        self.walk_inlines_mut(&mut |inline| {
            if let Inline::Image(image) = inline {
                f(image);
            }
        });
    }
}

pub fn walk_blocks_inlines(blocks: &mut [Block], f: &mut dyn FnMut(&mut Inline)) {
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Paragraph(inlines) => walk_inlines(inlines, f),
            Block::Heading { content, .. } => walk_inlines(content, f),
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                walk_blocks_inlines(inner, f);
            }
            Block::List { items, .. } => {
                for item in items {
                    walk_blocks_inlines(item, f);
                }
            }
            Block::CodeBlock { .. } | Block::Rule | Block::RawHtml(_) => {}
        }
    }
}

fn walk_inlines(inlines: &mut [Inline], f: &mut dyn FnMut(&mut Inline)) {
    for inline in inlines {
        f(inline);
        match inline {
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => walk_inlines(inner, f),
            Inline::Link(link) => walk_inlines(&mut link.content, f),
            Inline::Image(image) => walk_inlines(&mut image.alt, f),
            Inline::Note(blocks) => walk_blocks_inlines(blocks, f),
            _ => {}
        }
    }
}

/// Plain-text rendering of an inline run, for slugs, tooltips, and checks.
pub fn inlines_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inlines_text(inlines, &mut out);
    out
}

fn push_inlines_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Str(s) | Inline::Code(s) => out.push_str(s),
            Inline::Math { src, .. } => out.push_str(src),
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner) => push_inlines_text(inner, out),
            Inline::Link(link) => push_inlines_text(&link.content, out),
            Inline::Image(image) => push_inlines_text(&image.alt, out),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::RawHtml(_) | Inline::Note(_) => {}
        }
    }
}

/// Plain-text rendering of a block run (footnote bodies).
pub fn blocks_text(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Plain(inlines) | Block::Paragraph(inlines) => {
                push_inlines_text(inlines, &mut out);
            }
            Block::Heading { content, .. } => push_inlines_text(content, &mut out),
            Block::BlockQuote(inner) | Block::Div { content: inner, .. } => {
                out.push_str(&blocks_text(inner));
            }
            Block::List { items, .. } => {
                for item in items {
                    out.push_str(&blocks_text(item));
                    out.push(' ');
                }
            }
            Block::CodeBlock { text, .. } => out.push_str(text),
            Block::Rule | Block::RawHtml(_) => {}
        }
        out.push(' ');
    }
    out.trim().to_string()
}
