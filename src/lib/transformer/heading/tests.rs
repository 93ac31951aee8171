use super::run;
use crate::ast::{Block, Inline};
use crate::ast::parse::parse_markdown;
use crate::transformer::PassError;

#[test]
fn headings_become_title_cased_self_links() {
    let mut doc = parse_markdown("## the genetics of intelligence\n\ntext\n");
    run(&mut doc).unwrap();

    let Block::Heading { attr, content, .. } = &doc.blocks[0] else {
        panic!("expected heading");
    };
    assert_eq!(attr.id, "the-genetics-of-intelligence");
    let [Inline::Link(link)] = content.as_slice() else {
        panic!("expected a single self-link, got {content:?}");
    };
    assert_eq!(link.url, "#the-genetics-of-intelligence");
    assert_eq!(
        link.title,
        "Link to section: \u{00A7} 'the genetics of intelligence'"
    );
    assert_eq!(
        crate::ast::inlines_text(&link.content),
        "The Genetics of Intelligence"
    );
}

#[test]
fn explicit_id_with_period_fails_naming_it() {
    let mut doc = parse_markdown("## Intro {#sec.1}\n");
    match run(&mut doc) {
        Err(PassError::ForbiddenHeadingId(id)) => assert_eq!(id, "sec.1"),
        other => panic!("expected forbidden-id failure, got {other:?}"),
    }
}

#[test]
fn unsluggable_heading_fails() {
    // Nothing alphanumeric survives slugification.
    let mut doc = parse_markdown("## !!!\n");
    assert!(matches!(run(&mut doc), Err(PassError::EmptyHeadingId(_))));
}

#[test]
fn duplicate_heading_titles_get_distinct_ids() {
    let mut doc = parse_markdown("## Results\n\n## Results\n");
    run(&mut doc).unwrap();
    let ids: Vec<String> = doc
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Heading { attr, .. } => Some(attr.id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["results".to_string(), "results-2".to_string()]);
}

#[test]
fn emitted_ids_satisfy_the_fragment_contract() {
    let mut doc = parse_markdown("# One Two\n\n## Three, four & five!\n\n### sixth\n");
    run(&mut doc).unwrap();
    let mut checked = 0;
    for block in &doc.blocks {
        if let Block::Heading { attr, .. } = block {
            assert!(!attr.id.is_empty());
            for forbidden in ['.', '#', ':'] {
                assert!(!attr.id.contains(forbidden));
            }
            checked += 1;
        }
    }
    assert_eq!(checked, 3);
}
