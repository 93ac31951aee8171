use proptest::{
    prelude::*,
    test_runner::{Config, TestRunner},
};

use super::{break_equals, break_slashes, cycle_rules, decorate_html};
use crate::ast::{Block, Doc, Inline};
use crate::ast::parse::parse_markdown;

const ZWSP: char = '\u{200B}';

#[test]
fn slash_break_inserts_zero_width_space() {
    assert_eq!(break_slashes("either/or"), format!("either/{ZWSP}or"));
    // Already spaced: untouched.
    assert_eq!(break_slashes("either / or"), "either / or");
    // Double slashes (protocols) untouched.
    assert_eq!(break_slashes("https://example.com"), "https://example.com");
}

#[test]
fn slash_break_preserves_text_modulo_zwsp() {
    let mut runner = TestRunner::new(Config {
        cases: 256,
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(&"[a-zA-Z0-9/ .]{0,40}", |text| {
            let broken = break_slashes(&text);
            let stripped: String = broken.chars().filter(|c| *c != ZWSP).collect();
            prop_assert_eq!(stripped, text);
            Ok(())
        })
        .unwrap();
}

#[test]
fn slash_break_never_corrupts_html_tags() {
    let html = r#"<a href="/a/b">x/y</a> and <br/> c/d"#;
    let out = decorate_html(html);
    assert!(out.contains(r#"<a href="/a/b">"#), "{out}");
    assert!(out.contains("<br/>"), "{out}");
    assert!(out.contains(&format!("x/{ZWSP}y")), "{out}");
    assert!(out.contains(&format!("c/{ZWSP}d")), "{out}");
}

#[test]
fn equals_gets_spaced_when_jammed() {
    assert_eq!(break_equals("x=1"), "x = 1");
    assert_eq!(break_equals("a\u{2260}b"), "a \u{2260} b");
    // Already spaced stays put.
    assert_eq!(break_equals("x = 1"), "x = 1");
}

#[test]
fn rules_cycle_mod_three_in_source_order() {
    // Seven rules, one pair nested, per the alternating-decoration contract.
    let mut doc = Doc {
        blocks: vec![
            Block::Rule,
            Block::Rule,
            Block::BlockQuote(vec![Block::Rule, Block::Rule]),
            Block::Rule,
            Block::Rule,
            Block::Rule,
        ],
    };
    let mut counter = 0;
    cycle_rules(&mut doc.blocks, &mut counter);
    assert_eq!(counter, 7);

    let mut classes = Vec::new();
    collect_rule_classes(&doc.blocks, &mut classes);
    assert_eq!(
        classes,
        vec![
            "horizontalRule-nth-0",
            "horizontalRule-nth-1",
            "horizontalRule-nth-2",
            "horizontalRule-nth-0",
            "horizontalRule-nth-1",
            "horizontalRule-nth-2",
            "horizontalRule-nth-0",
        ]
    );
}

fn collect_rule_classes(blocks: &[Block], out: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Div { attr, content } => {
                if matches!(content.as_slice(), [Block::Rule]) {
                    out.extend(attr.classes.iter().cloned());
                }
                collect_rule_classes(content, out);
            }
            Block::BlockQuote(inner) => collect_rule_classes(inner, out),
            Block::List { items, .. } => {
                for item in items {
                    collect_rule_classes(item, out);
                }
            }
            _ => {}
        }
    }
}

#[test]
fn link_text_slashes_get_hair_space_padding() {
    let mut doc = parse_markdown("[either/or](https://example.com/x)");
    super::run(&mut doc);
    let mut found = false;
    doc.walk_links_mut(&mut |link| {
        if let Some(Inline::Str(text)) = link.content.first() {
            assert!(text.contains('\u{200A}'), "no hair space in {text:?}");
            found = true;
        }
    });
    assert!(found);
}

#[test]
fn live_and_icon_classes() {
    let mut doc = parse_markdown(
        "[w](https://en.wikipedia.org/wiki/X) [p](/doc/a.pdf) [n](https://www.nytimes.com/x)",
    );
    super::run(&mut doc);
    let mut seen = Vec::new();
    doc.walk_links_mut(&mut |link| seen.push((link.url.clone(), link.attr.classes.clone())));

    let wiki = &seen[0].1;
    assert!(wiki.contains(&"link-live".to_string()));
    assert!(wiki.contains(&"link-icon-wikipedia".to_string()));

    let pdf = &seen[1].1;
    assert!(pdf.contains(&"link-icon-pdf".to_string()));
    assert!(!pdf.contains(&"link-live".to_string()));

    let news = &seen[2].1;
    assert!(news.contains(&"link-icon-newspaper".to_string()));
}
