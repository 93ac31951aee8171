//! Document tree to HTML.
//!
//! The writer runs exactly once per document, after the rewrite passes.
//! Footnotes are numbered in source order and emitted as an end-of-document
//! list; code blocks are highlighted here so passes never see markup.

use std::fmt::Write as _;
use std::sync::OnceLock;

use katex::Opts;
use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::{SyntaxReference, SyntaxSet},
};

use super::{Attr, Block, Doc, Inline};
use crate::utils::{escape_attr, escape_text};

pub fn doc_to_html(doc: &Doc) -> String {
    let mut w = Writer::default();
    w.blocks(&doc.blocks);
    w.finish()
}

/// Render a bare inline run (fragment titles, synthetic paragraphs).
pub fn inlines_to_html(inlines: &[Inline]) -> String {
    let mut w = Writer::default();
    w.inlines(inlines);
    w.out
}

#[derive(Default)]
struct Writer {
    out: String,
    notes: Vec<String>,
}

impl Writer {
    fn finish(mut self) -> String {
        if self.notes.is_empty() {
            return self.out;
        }
        let notes = std::mem::take(&mut self.notes);
        self.out
            .push_str("<section class=\"footnotes\">\n<hr />\n<ol>\n");
        for (i, body) in notes.iter().enumerate() {
            let n = i + 1;
            let _ = write!(
                self.out,
                "<li id=\"fn{n}\">{body} <a href=\"#fnref{n}\" class=\"footnote-back\">\u{21A9}\u{FE0E}</a></li>\n"
            );
        }
        self.out.push_str("</ol>\n</section>\n");
        self.out
    }

    fn blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.block(block);
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Plain(inlines) => {
                self.inlines(inlines);
                self.out.push('\n');
            }
            Block::Paragraph(inlines) => {
                self.out.push_str("<p>");
                self.inlines(inlines);
                self.out.push_str("</p>\n");
            }
            Block::Heading {
                level,
                attr,
                content,
            } => {
                let _ = write!(self.out, "<h{level}");
                self.attr(attr);
                self.out.push('>');
                self.inlines(content);
                let _ = write!(self.out, "</h{level}>\n");
            }
            Block::BlockQuote(inner) => {
                self.out.push_str("<blockquote>\n");
                self.blocks(inner);
                self.out.push_str("</blockquote>\n");
            }
            Block::CodeBlock { lang, text } => {
                self.out.push_str(&highlight_code(text, lang));
            }
            Block::List { start, items } => {
                match start {
                    Some(1) => self.out.push_str("<ol>\n"),
                    Some(n) => {
                        let _ = write!(self.out, "<ol start=\"{n}\">\n");
                    }
                    None => self.out.push_str("<ul>\n"),
                }
                for item in items {
                    self.out.push_str("<li>");
                    self.blocks(item);
                    self.out.push_str("</li>\n");
                }
                self.out
                    .push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
            }
            Block::Rule => self.out.push_str("<hr />\n"),
            Block::Div { attr, content } => {
                self.out.push_str("<div");
                self.attr(attr);
                self.out.push_str(">\n");
                self.blocks(content);
                self.out.push_str("</div>\n");
            }
            Block::RawHtml(html) => {
                self.out.push_str(html);
                if !html.ends_with('\n') {
                    self.out.push('\n');
                }
            }
        }
    }

    fn inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            self.inline(inline);
        }
    }

    fn inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Str(s) => self.out.push_str(&escape_text(s)),
            Inline::Code(s) => {
                self.out.push_str("<code>");
                self.out.push_str(&escape_text(s));
                self.out.push_str("</code>");
            }
            Inline::Emph(inner) => self.wrap("em", inner),
            Inline::Strong(inner) => self.wrap("strong", inner),
            Inline::Strikeout(inner) => self.wrap("del", inner),
            Inline::Superscript(inner) => self.wrap("sup", inner),
            Inline::Subscript(inner) => self.wrap("sub", inner),
            Inline::Math { display, src } => {
                self.out.push_str(&render_math(src, *display));
            }
            Inline::Link(link) => {
                let _ = write!(self.out, "<a href=\"{}\"", escape_attr(&link.url));
                if !link.title.is_empty() {
                    let _ = write!(self.out, " title=\"{}\"", escape_attr(&link.title));
                }
                self.attr(&link.attr);
                self.out.push('>');
                self.inlines(&link.content);
                self.out.push_str("</a>");
            }
            Inline::Image(image) => {
                let _ = write!(
                    self.out,
                    "<img src=\"{}\" alt=\"{}\"",
                    escape_attr(&image.url),
                    escape_attr(&super::inlines_text(&image.alt))
                );
                if !image.title.is_empty() {
                    let _ = write!(self.out, " title=\"{}\"", escape_attr(&image.title));
                }
                self.attr(&image.attr);
                self.out.push_str(" />");
            }
            Inline::RawHtml(html) => self.out.push_str(html),
            Inline::SoftBreak => self.out.push('\n'),
            Inline::HardBreak => self.out.push_str("<br />\n"),
            Inline::Note(blocks) => {
                let mut sub = Writer::default();
                sub.blocks(blocks);
                // Notes inside notes are flattened into the same list.
                let nested = std::mem::take(&mut sub.notes);
                self.notes.push(sub.out.trim_end().to_string());
                let n = self.notes.len();
                self.notes.extend(nested);
                let _ = write!(
                    self.out,
                    "<sup class=\"footnote-ref\"><a id=\"fnref{n}\" href=\"#fn{n}\">{n}</a></sup>"
                );
            }
        }
    }

    fn wrap(&mut self, tag: &str, inner: &[Inline]) {
        let _ = write!(self.out, "<{tag}>");
        self.inlines(inner);
        let _ = write!(self.out, "</{tag}>");
    }

    fn attr(&mut self, attr: &Attr) {
        if !attr.id.is_empty() {
            let _ = write!(self.out, " id=\"{}\"", escape_attr(&attr.id));
        }
        if !attr.classes.is_empty() {
            let _ = write!(self.out, " class=\"{}\"", escape_attr(&attr.classes.join(" ")));
        }
        for (k, v) in &attr.kvs {
            let _ = write!(self.out, " {}=\"{}\"", k, escape_attr(v));
        }
    }
}

fn render_math(source: &str, display_mode: bool) -> String {
    let mut builder = Opts::builder();
    builder.display_mode(display_mode);

    let opts = builder.build().unwrap_or_default();

    match katex::render_with_opts(source, &opts) {
        Ok(res) => res,
        Err(_) => escape_text(source),
    }
}

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

static THEME: OnceLock<Theme> = OnceLock::new();
fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let themes = ThemeSet::load_defaults();
        themes
            .themes
            .get("InspiredGitHub")
            .cloned()
            .unwrap_or_default()
    })
}

fn highlight_code(source: &str, language: &str) -> String {
    let language = (!language.is_empty()).then_some(language);
    let syntax_set = syntax_set();
    let syntax: &SyntaxReference = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    highlighted_html_for_string(source, syntax_set, syntax, theme())
        .unwrap_or_else(|_| fallback_plain(source, language))
}

/// Backup renderer in case syntect fails for whatever reason.
fn fallback_plain(source: &str, language: Option<&str>) -> String {
    let mut out = String::with_capacity(source.len() + 32);
    out.push_str("<pre><code");
    if let Some(lang) = language {
        out.push_str(" class=\"language-");
        out.push_str(lang);
        out.push('"');
    }
    out.push('>');
    out.push_str(&escape_text(source));
    out.push_str("</code></pre>\n");
    out
}
