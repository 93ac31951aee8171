//! Markdown to document tree.
//!
//! Folds the pulldown-cmark event stream into [`Block`]s and [`Inline`]s.
//! Footnote definitions are collected in a first pass so a reference can be
//! inlined as a [`Inline::Note`] regardless of where its definition sits.
//! Tables are rendered straight to HTML here; no pass touches table interiors.

use std::collections::HashMap;
use std::iter::Peekable;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{Attr, Block, Doc, Image, Inline, Link};

type Defs = HashMap<String, Vec<Block>>;

pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_GFM);
    options.insert(Options::ENABLE_MATH);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_SUPERSCRIPT);
    options.insert(Options::ENABLE_SUBSCRIPT);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

pub fn parse_markdown(src: &str) -> Doc {
    let events: Vec<Event<'_>> = Parser::new_ext(src, parser_options()).collect();

    // First pass: pull footnote definitions out of the stream.
    let mut defs: Defs = HashMap::new();
    let mut body: Vec<Event<'_>> = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();
    while let Some(ev) = iter.next() {
        match ev {
            Event::Start(Tag::FootnoteDefinition(label)) => {
                let inner = collect_footnote_def(&mut iter);
                let blocks = build_blocks(&mut inner.into_iter().peekable(), &Defs::new());
                defs.insert(label.to_string(), blocks);
            }
            other => body.push(other),
        }
    }

    let blocks = build_blocks(&mut body.into_iter().peekable(), &defs);
    Doc { blocks }
}

fn collect_footnote_def<'a>(iter: &mut impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut depth = 1usize;
    let mut buf = Vec::new();
    for ev in iter {
        match ev {
            Event::Start(Tag::FootnoteDefinition(_)) => {
                depth += 1;
                buf.push(ev);
            }
            Event::End(TagEnd::FootnoteDefinition) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                buf.push(ev);
            }
            other => buf.push(other),
        }
    }
    buf
}

fn is_block_start(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::BlockQuote(_)
            | Tag::CodeBlock(_)
            | Tag::List(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::Table(_)
            | Tag::FootnoteDefinition(_)
    )
}

fn build_blocks<'a, I>(it: &mut Peekable<I>, defs: &Defs) -> Vec<Block>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut out = Vec::new();
    loop {
        match it.peek() {
            None | Some(Event::End(_)) => break,
            Some(Event::Start(tag)) if is_block_start(tag) => {
                let Some(Event::Start(tag)) = it.next() else {
                    unreachable!("peeked a block start")
                };
                build_block(tag, it, defs, &mut out);
            }
            Some(Event::Rule) => {
                it.next();
                out.push(Block::Rule);
            }
            Some(Event::Html(_)) => {
                let Some(Event::Html(html)) = it.next() else {
                    unreachable!("peeked an html block")
                };
                out.push(Block::RawHtml(html.to_string()));
            }
            // A bare inline run: tight list item content or similar.
            Some(_) => {
                let inlines = build_inlines(it, defs);
                if inlines.is_empty() {
                    // Whatever we peeked produced nothing; drop it rather
                    // than loop forever.
                    it.next();
                } else {
                    out.push(Block::Plain(inlines));
                }
            }
        }
    }
    out
}

fn build_block<'a, I>(tag: Tag<'a>, it: &mut Peekable<I>, defs: &Defs, out: &mut Vec<Block>)
where
    I: Iterator<Item = Event<'a>>,
{
    match tag {
        Tag::Paragraph => {
            let inlines = build_inlines(it, defs);
            consume_end(it);
            out.push(Block::Paragraph(inlines));
        }
        Tag::Heading {
            level,
            id,
            classes,
            attrs,
        } => {
            let attr = Attr {
                id: id.map(|c| c.to_string()).unwrap_or_default(),
                classes: classes.iter().map(|c| c.to_string()).collect(),
                kvs: attrs
                    .iter()
                    .map(|(k, v)| {
                        (
                            k.to_string(),
                            v.as_ref().map(|c| c.to_string()).unwrap_or_default(),
                        )
                    })
                    .collect(),
            };
            let content = build_inlines(it, defs);
            consume_end(it);
            out.push(Block::Heading {
                level: heading_level(level),
                attr,
                content,
            });
        }
        Tag::BlockQuote(_) => {
            let inner = build_blocks(it, defs);
            consume_end(it);
            out.push(Block::BlockQuote(inner));
        }
        Tag::CodeBlock(kind) => {
            let lang = match kind {
                CodeBlockKind::Fenced(l) => l.to_string(),
                CodeBlockKind::Indented => String::new(),
            };
            let mut text = String::new();
            loop {
                match it.peek() {
                    Some(Event::End(TagEnd::CodeBlock)) | None => break,
                    _ => {}
                }
                if let Some(Event::Text(t)) = it.next() {
                    text.push_str(&t);
                }
            }
            consume_end(it);
            out.push(Block::CodeBlock { lang, text });
        }
        Tag::List(start) => {
            let mut items = Vec::new();
            loop {
                match it.peek() {
                    Some(Event::Start(Tag::Item)) => {
                        it.next();
                        let item = build_blocks(it, defs);
                        consume_end(it);
                        items.push(item);
                    }
                    _ => break,
                }
            }
            consume_end(it);
            out.push(Block::List { start, items });
        }
        Tag::HtmlBlock => {
            let mut html = String::new();
            loop {
                match it.peek() {
                    Some(Event::End(TagEnd::HtmlBlock)) | None => break,
                    _ => {}
                }
                match it.next() {
                    Some(Event::Html(h)) | Some(Event::Text(h)) => html.push_str(&h),
                    _ => {}
                }
            }
            consume_end(it);
            out.push(Block::RawHtml(html));
        }
        Tag::MetadataBlock(_) => {
            // Front matter is parsed separately; skip its events.
            loop {
                match it.next() {
                    Some(Event::End(TagEnd::MetadataBlock(_))) | None => break,
                    _ => {}
                }
            }
        }
        Tag::Table(_) => {
            // Re-render table interiors with the stock HTML emitter; no
            // rewrite pass needs to see inside them.
            let mut buf = vec![Event::Start(tag)];
            loop {
                match it.next() {
                    Some(ev @ Event::End(TagEnd::Table)) => {
                        buf.push(ev);
                        break;
                    }
                    Some(ev) => buf.push(ev),
                    None => break,
                }
            }
            let mut html = String::new();
            pulldown_cmark::html::push_html(&mut html, buf.into_iter());
            out.push(Block::RawHtml(html));
        }
        Tag::FootnoteDefinition(_) => {
            // Already extracted in the first pass; drain defensively.
            let mut depth = 1usize;
            for ev in it.by_ref() {
                match ev {
                    Event::Start(Tag::FootnoteDefinition(_)) => depth += 1,
                    Event::End(TagEnd::FootnoteDefinition) => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn build_inlines<'a, I>(it: &mut Peekable<I>, defs: &Defs) -> Vec<Inline>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut out: Vec<Inline> = Vec::new();
    loop {
        match it.peek() {
            None | Some(Event::End(_)) | Some(Event::Rule) => break,
            Some(Event::Start(tag)) if is_block_start(tag) => break,
            _ => {}
        }
        let Some(ev) = it.next() else { break };
        match ev {
            Event::Text(t) => push_str(&mut out, &t),
            Event::Code(t) => out.push(Inline::Code(t.to_string())),
            Event::InlineMath(m) => out.push(Inline::Math {
                display: false,
                src: m.to_string(),
            }),
            Event::DisplayMath(m) => out.push(Inline::Math {
                display: true,
                src: m.to_string(),
            }),
            Event::InlineHtml(h) | Event::Html(h) => out.push(Inline::RawHtml(h.to_string())),
            Event::SoftBreak => out.push(Inline::SoftBreak),
            Event::HardBreak => out.push(Inline::HardBreak),
            Event::FootnoteReference(label) => {
                out.push(Inline::Note(
                    defs.get(label.as_ref()).cloned().unwrap_or_default(),
                ));
            }
            Event::TaskListMarker(checked) => {
                push_str(&mut out, if checked { "[x] " } else { "[ ] " });
            }
            Event::Start(Tag::Emphasis) => {
                let inner = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Emph(inner));
            }
            Event::Start(Tag::Strong) => {
                let inner = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Strong(inner));
            }
            Event::Start(Tag::Strikethrough) => {
                let inner = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Strikeout(inner));
            }
            Event::Start(Tag::Superscript) => {
                let inner = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Superscript(inner));
            }
            Event::Start(Tag::Subscript) => {
                let inner = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Subscript(inner));
            }
            Event::Start(Tag::Link {
                dest_url,
                title,
                id,
                ..
            }) => {
                let content = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Link(Link {
                    attr: Attr {
                        id: id.to_string(),
                        ..Attr::default()
                    },
                    url: dest_url.to_string(),
                    title: title.to_string(),
                    content,
                }));
            }
            Event::Start(Tag::Image {
                dest_url,
                title,
                id,
                ..
            }) => {
                let alt = build_inlines(it, defs);
                consume_end(it);
                out.push(Inline::Image(Image {
                    attr: Attr {
                        id: id.to_string(),
                        ..Attr::default()
                    },
                    url: dest_url.to_string(),
                    title: title.to_string(),
                    alt,
                }));
            }
            _ => {}
        }
    }
    out
}

/// Append text, merging with a preceding `Str` so passes that match phrases
/// see whole runs rather than parser-split fragments.
fn push_str(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Str(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Str(text.to_string()));
    }
}

fn consume_end<'a, I>(it: &mut Peekable<I>)
where
    I: Iterator<Item = Event<'a>>,
{
    if matches!(it.peek(), Some(Event::End(_))) {
        it.next();
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
