use super::{Route, author::normalize_authors, route};
use crate::scrape::{arxiv, biorxiv, pdf, pubmed};

#[test]
fn routing_first_match_wins() {
    assert_eq!(route("https://en.wikipedia.org/wiki/Attention"), Route::Wikipedia);
    assert_eq!(
        route("https://arxiv.org/abs/1706.03762"),
        Route::Arxiv("1706.03762".to_string())
    );
    assert_eq!(
        route("https://arxiv.org/pdf/1706.03762.pdf"),
        Route::Arxiv("1706.03762".to_string())
    );
    assert_eq!(
        route("https://www.biorxiv.org/content/10.1101/2020.05.01.072801v1"),
        Route::Biorxiv
    );
    assert_eq!(
        route("https://www.medrxiv.org/content/10.1101/2021.01.01.21249111v1"),
        Route::Biorxiv
    );
    assert_eq!(
        route("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC4109789/"),
        Route::Pubmed
    );
    assert_eq!(
        route("https://journals.plos.org/plosone/article?id=10.1371/journal.pone.0000000"),
        Route::Pubmed
    );
    assert_eq!(route(""), Route::Empty);
    assert_eq!(route("/doc/stats/1975-johnson.pdf"), Route::LocalPdf);
    assert_eq!(route("/improvement"), Route::SelfPage);
    assert_eq!(route("?page-definition"), Route::SelfPage);
    assert_eq!(route("https://example.com/whatever"), Route::Unscrapable);
}

#[test]
fn biorxiv_is_not_mistaken_for_arxiv() {
    assert!(arxiv::arxiv_id("https://www.biorxiv.org/content/10.1101/xyz").is_none());
    assert!(arxiv::arxiv_id("https://www.medrxiv.org/content/10.1101/xyz").is_none());
}

#[test]
fn author_normalization() {
    assert_eq!(normalize_authors("A.Smith"), "A. Smith");
    assert_eq!(normalize_authors("A.B. Smith"), "A. B. Smith");
    assert_eq!(normalize_authors("A Smith"), "A. Smith");
    assert_eq!(
        normalize_authors("Alice Johnson and Bob Quux"),
        "Alice Johnson, Bob Quux"
    );
    assert_eq!(
        normalize_authors("Alice Johnson, & Bob Quux"),
        "Alice Johnson, Bob Quux"
    );
    assert_eq!(
        normalize_authors("Alice Johnson, and Bob Quux"),
        "Alice Johnson, Bob Quux"
    );
}

#[test]
fn arxiv_atom_parsing() {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <entry>
    <title>Attention Is All
 You Need</title>
    <published>2017-06-12T17:57:34Z</published>
    <summary>  The dominant sequence transduction models are based on complex recurrent
networks.
  We propose a new architecture, 50\% simpler.
</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <author><name>Niki Parmar</name></author>
    <arxiv:doi>10.48550/arXiv.1706.03762</arxiv:doi>
  </entry>
</feed>"#;
    let item = arxiv::parse_atom(body).expect("parses");
    assert_eq!(item.title, "Attention Is All You Need");
    assert_eq!(item.date, "2017-06-12");
    assert_eq!(item.doi, "10.48550/arXiv.1706.03762");
    assert_eq!(item.author, "Ashish Vaswani, Noam Shazeer, Niki Parmar");
    assert!(item.abstract_html.starts_with("<p>"));
    assert!(item.abstract_html.contains("50%"));
    // The indented continuation marks a paragraph break.
    assert!(item.abstract_html.matches("<p>").count() >= 2);
}

#[test]
fn arxiv_empty_feed_is_permanent() {
    let body = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
    match arxiv::parse_atom(body) {
        Err(super::ScrapeError::Permanent(_)) => {}
        other => panic!("expected permanent failure, got {other:?}"),
    }
}

#[test]
fn biorxiv_meta_extraction() {
    let html = r#"<html><head>
<meta name="DC.Title" content="A Preprint Title" />
<meta name="DC.Date" content="2020-05-01" />
<meta name="DC.Contributor" content="Alice Johnson" />
<meta name="DC.Contributor" content="Bob Quux" />
<meta name="citation_doi" content="10.1101/2020.05.01.072801" />
<meta name="citation_abstract" content="&lt;p&gt;Findings (n=30).&lt;/p&gt;" />
</head></html>"#;
    let item = biorxiv::parse_meta_tags(html).expect("parses");
    assert_eq!(item.title, "A Preprint Title");
    assert_eq!(item.author, "Alice Johnson, Bob Quux");
    assert_eq!(item.date, "2020-05-01");
    assert_eq!(item.doi, "10.1101/2020.05.01.072801");
    assert_eq!(item.abstract_html, "<p>Findings (<em>n</em> = 30).</p>");
}

#[test]
fn biorxiv_missing_title_is_permanent() {
    match biorxiv::parse_meta_tags("<html></html>") {
        Err(super::ScrapeError::Permanent(_)) => {}
        other => panic!("expected permanent failure, got {other:?}"),
    }
}

#[test]
fn pubmed_helper_output_shape() {
    let ok = "A Title\nAlice Johnson and Bob Quux\n1999-07-04\n10.1/abc\n<p>Long abstract.</p>";
    let item = pubmed::parse_helper_output(ok).expect("parses");
    assert_eq!(item.title, "A Title");
    assert_eq!(item.author, "Alice Johnson, Bob Quux");
    assert_eq!(item.date, "1999-07-04");

    match pubmed::parse_helper_output("only\nfour\nlines\nhere") {
        Err(super::ScrapeError::Permanent(_)) => {}
        other => panic!("expected permanent failure, got {other:?}"),
    }
}

#[test]
fn pdf_author_heuristic() {
    // Software in the Author field: use Creator.
    assert_eq!(pdf::pick_author("Adobe InDesign CC", "Alice Johnson"), "Alice Johnson");
    // Creator carries more of a name than a bare initial.
    assert_eq!(pdf::pick_author("A. J.", "Alice Johnson"), "Alice Johnson");
    // Sensible Author wins.
    assert_eq!(pdf::pick_author("Alice Johnson, Bob Quux", "TeX"), "Alice Johnson, Bob Quux");
}

#[test]
fn exif_date_normalization() {
    assert_eq!(pdf::normalize_exif_date("2019:03:04 10:11:12"), "2019-03-04");
    assert_eq!(pdf::normalize_exif_date("1975-03-01"), "1975-03-01");
    assert_eq!(pdf::normalize_exif_date(""), "");
}
