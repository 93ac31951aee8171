//! The abstract-cleaning rule tables, in application order.
//!
//! Keeping the rules as data keeps them reviewable and testable on their
//! own: the tests apply every rule twice and assert the second application
//! changes nothing.

/// Regex substitutions, applied first.
pub(super) const REGEX_RULES: &[(&str, &str)] = &[
    // En dash used as a phrasal dash becomes an em dash.
    (r" – ", "—"),
    // Dimension notation: 10x2 becomes 10×2.
    (r"(\d) ?x ?(\d)", "${1}×${2}"),
    // Superscripted ordinals: 21st gains a <sup>.
    (r"(\d)(st|nd|rd|th)\b", "${1}<sup>${2}</sup>"),
    // JEL classification tags add nothing outside economics journals.
    (r"\s*\(JEL [^)]*\)\.?", ""),
    (r"\s*JEL [Cc]lassifications?:[^.]*\.", ""),
    // Statistical notation: p<.05, n=10, N = 30.
    (
        r"\b([pP])\s*(?:&lt;|<)\s*0?\.([0-9]+)",
        "<em>${1}</em> < 0.${2}",
    ),
    (r"\b([nN])\s*=\s*([0-9])", "<em>${1}</em> = ${2}"),
    // Space out plus-minus jammed between digits.
    (r"([0-9])±([0-9])", "${1} ± ${2}"),
    // Spaced hyphen posing as a dash.
    (r"([a-z]) - ([a-z])", "${1}—${2}"),
];

/// Fixed-string substitutions, applied in order after the regex rules.
pub(super) const LITERAL_RULES: &[(&str, &str)] = &[
    // JATS tag translation.
    ("<jats:p>", "<p>"),
    ("</jats:p>", "</p>"),
    ("<jats:p xml:lang=\"en\">", "<p>"),
    ("<jats:italic>", "<em>"),
    ("</jats:italic>", "</em>"),
    ("<jats:italic toggle=\"yes\">", "<em>"),
    ("<jats:bold>", "<strong>"),
    ("</jats:bold>", "</strong>"),
    ("<jats:sup>", "<sup>"),
    ("</jats:sup>", "</sup>"),
    ("<jats:sub>", "<sub>"),
    ("</jats:sub>", "</sub>"),
    ("<jats:sc>", "<span class=\"smallcaps\">"),
    ("</jats:sc>", "</span>"),
    ("<jats:title>Abstract</jats:title>", ""),
    ("<jats:title>", "<strong>"),
    ("</jats:title>", "</strong>: "),
    ("<jats:sec>", ""),
    ("</jats:sec>", ""),
    ("<jats:sec id=\"abstract\">", ""),
    ("<jats:list list-type=\"bullet\">", "<ul>"),
    ("<jats:list list-type=\"order\">", "<ol>"),
    ("</jats:list>", "</ul>"),
    ("<jats:list-item>", "<li>"),
    ("</jats:list-item>", "</li>"),
    ("<jats:inline-formula>", ""),
    ("</jats:inline-formula>", ""),
    // Section headings inside abstracts collapse to run-in bold labels.
    ("<h3>Abstract</h3>\n<p>", "<p>"),
    ("<h3>Background</h3>\n<p>", "<p><strong>Background</strong>: "),
    ("<h3>Aims</h3>\n<p>", "<p><strong>Aims</strong>: "),
    ("<h3>Aim</h3>\n<p>", "<p><strong>Aim</strong>: "),
    ("<h3>Context</h3>\n<p>", "<p><strong>Context</strong>: "),
    ("<h3>Purpose</h3>\n<p>", "<p><strong>Purpose</strong>: "),
    ("<h3>Rationale</h3>\n<p>", "<p><strong>Rationale</strong>: "),
    ("<h3>Objective</h3>\n<p>", "<p><strong>Objective</strong>: "),
    ("<h3>Objectives</h3>\n<p>", "<p><strong>Objectives</strong>: "),
    ("<h3>Introduction</h3>\n<p>", "<p><strong>Introduction</strong>: "),
    ("<h3>Importance</h3>\n<p>", "<p><strong>Importance</strong>: "),
    ("<h3>Method</h3>\n<p>", "<p><strong>Method</strong>: "),
    ("<h3>Methods</h3>\n<p>", "<p><strong>Methods</strong>: "),
    (
        "<h3>Materials and methods</h3>\n<p>",
        "<p><strong>Materials and Methods</strong>: ",
    ),
    (
        "<h3>Materials and Methods</h3>\n<p>",
        "<p><strong>Materials and Methods</strong>: ",
    ),
    ("<h3>Design</h3>\n<p>", "<p><strong>Design</strong>: "),
    ("<h3>Setting</h3>\n<p>", "<p><strong>Setting</strong>: "),
    ("<h3>Participants</h3>\n<p>", "<p><strong>Participants</strong>: "),
    ("<h3>Interventions</h3>\n<p>", "<p><strong>Interventions</strong>: "),
    ("<h3>Measurements</h3>\n<p>", "<p><strong>Measurements</strong>: "),
    ("<h3>Results</h3>\n<p>", "<p><strong>Results</strong>: "),
    ("<h3>Findings</h3>\n<p>", "<p><strong>Findings</strong>: "),
    ("<h3>Discussion</h3>\n<p>", "<p><strong>Discussion</strong>: "),
    ("<h3>Conclusion</h3>\n<p>", "<p><strong>Conclusion</strong>: "),
    ("<h3>Conclusions</h3>\n<p>", "<p><strong>Conclusions</strong>: "),
    ("<h3>Significance</h3>\n<p>", "<p><strong>Significance</strong>: "),
    (
        "<h3>Interpretation</h3>\n<p>",
        "<p><strong>Interpretation</strong>: ",
    ),
    ("<h3>Funding</h3>\n<p>", "<p><strong>Funding</strong>: "),
    ("<h4>Background</h4>\n<p>", "<p><strong>Background</strong>: "),
    ("<h4>Objective</h4>\n<p>", "<p><strong>Objective</strong>: "),
    ("<h4>Objectives</h4>\n<p>", "<p><strong>Objectives</strong>: "),
    ("<h4>Methods</h4>\n<p>", "<p><strong>Methods</strong>: "),
    ("<h4>Results</h4>\n<p>", "<p><strong>Results</strong>: "),
    ("<h4>Conclusions</h4>\n<p>", "<p><strong>Conclusions</strong>: "),
    ("<h4>Conclusion</h4>\n<p>", "<p><strong>Conclusion</strong>: "),
    // Run-in labels the publisher already bolded but punctuated oddly.
    ("<p><strong>Abstract</strong>: ", "<p>"),
    ("<p>Abstract: ", "<p>"),
    ("<p>ABSTRACT: ", "<p>"),
    ("<p>Abstract</p>", ""),
    ("<p>Highlights</p>", ""),
    ("<p>Graphical abstract</p>", ""),
    // Publisher boilerplate.
    (
        "This article is protected by copyright. All rights reserved.",
        "",
    ),
    ("All rights reserved.", ""),
    ("© The Author(s).", ""),
    ("© The Authors.", ""),
    ("Published by Elsevier Ltd.", ""),
    ("Published by Elsevier Inc.", ""),
    ("Published by Elsevier B.V.", ""),
    ("Published by Oxford University Press.", ""),
    ("This is an open access article distributed under the terms of the Creative Commons Attribution License.", ""),
    ("Copyright © ", "© "),
    // LaTeX/MathJax fragments that survive into Crossref abstracts.
    ("\\%", "%"),
    ("\\&", "&amp;"),
    ("$\\sim$", "~"),
    ("$\\approx$", "≈"),
    ("$\\times$", "×"),
    ("$\\pm$", "±"),
    ("\\textless{}", "&lt;"),
    ("\\textgreater{}", "&gt;"),
    ("{\\deg}", "°"),
    // Typography and units.
    ("+/-", "±"),
    (" percent ", "% "),
    ("one half", "50%"),
    (" , ", ", "),
    (" .</p>", ".</p>"),
    ("<p> ", "<p>"),
    (" </p>", "</p>"),
    ("<p></p>", ""),
    // Collapse doubled emphasis from nested publisher markup.
    ("<em><em>", "<em>"),
    ("</em></em>", "</em>"),
    ("<strong><strong>", "<strong>"),
    ("</strong></strong>", "</strong>"),
];
