//! LaTeX-flavored abstract text (arXiv summaries) to HTML.
//!
//! The summaries are mostly plain text with TeX escapes, `$…$` math runs,
//! and hard-wrapped lines where a wrapped-and-indented line marks a
//! paragraph break. Math is rendered here; everything else is a small
//! ordered set of text rewrites.

use std::sync::LazyLock;

use katex::Opts;
use regex::Regex;

use crate::utils::escape_text;

// Placeholder for an escaped dollar sign so it survives math splitting.
const DOLLAR: char = '\u{1}';

static TEXT_COMMANDS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\\textit\{([^}]*)\}", "<em>$1</em>"),
        (r"\\emph\{([^}]*)\}", "<em>$1</em>"),
        (r"\\textbf\{([^}]*)\}", "<strong>$1</strong>"),
        (r"\\texttt\{([^}]*)\}", "<code>$1</code>"),
        (r"\\textsc\{([^}]*)\}", "<span class=\"smallcaps\">$1</span>"),
        (r"\\url\{([^}]*)\}", "<a href=\"$1\">$1</a>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("static pattern"),
            replacement,
        )
    })
    .collect()
});

pub fn latex_to_html(src: &str) -> String {
    let protected = src.replace("\r\n", "\n").replace("\\$", &DOLLAR.to_string());

    // A newline followed by an indented continuation is a paragraph break;
    // any other newline is soft wrapping.
    let paragraphs: Vec<String> = protected
        .split("\n  ")
        .map(render_paragraph)
        .filter(|p| !p.is_empty())
        .collect();

    paragraphs
        .iter()
        .map(|p| format!("<p>{p}</p>"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_paragraph(para: &str) -> String {
    let mut out = String::with_capacity(para.len());
    // Alternate text / math on unescaped dollar signs.
    for (i, segment) in para.split('$').enumerate() {
        if i % 2 == 0 {
            out.push_str(&render_text(segment));
        } else {
            out.push_str(&render_math(segment));
        }
    }
    out.trim().to_string()
}

fn render_text(segment: &str) -> String {
    let unescaped = segment.replace("\\%", "%").replace("\\_", "_");
    let mut s = escape_text(&unescaped)
        // escape_text turned the TeX "\&" into "\&amp;"; the ampersand
        // entity itself is what we want.
        .replace("\\&amp;", "&amp;")
        .replace('\n', " ");
    for (re, replacement) in TEXT_COMMANDS.iter() {
        s = re.replace_all(&s, *replacement).into_owned();
    }
    s.replace(DOLLAR, "$")
}

fn render_math(segment: &str) -> String {
    let src = segment.replace(DOLLAR, "\\$");
    let mut builder = Opts::builder();
    builder.display_mode(false);
    let opts = builder.build().unwrap_or_default();
    match katex::render_with_opts(&src, &opts) {
        Ok(html) => html,
        Err(_) => format!("<em>{}</em>", escape_text(&src)),
    }
}

#[cfg(test)]
mod tests;
