use super::latex_to_html;

#[test]
fn paragraph_breaks_on_indented_continuation() {
    let out = latex_to_html("First paragraph\nstill wrapping.\n  Second paragraph.");
    assert_eq!(out, "<p>First paragraph still wrapping.</p>\n<p>Second paragraph.</p>");
}

#[test]
fn percent_escapes_are_normalized() {
    let out = latex_to_html("Accuracy improved by 12\\% overall.");
    assert_eq!(out, "<p>Accuracy improved by 12% overall.</p>");
}

#[test]
fn text_commands_render_as_markup() {
    let out = latex_to_html("We \\emph{strongly} suggest \\texttt{adam}.");
    assert_eq!(out, "<p>We <em>strongly</em> suggest <code>adam</code>.</p>");
}

#[test]
fn text_is_html_escaped() {
    let out = latex_to_html("bounds of a<b hold");
    assert_eq!(out, "<p>bounds of a&lt;b hold</p>");
}

#[test]
fn math_segments_do_not_leak_dollar_signs() {
    let out = latex_to_html("loss $L_2$ regularization");
    assert!(!out.contains('$'), "{out}");
    assert!(out.starts_with("<p>loss "));
}

#[test]
fn escaped_dollars_stay_literal() {
    let out = latex_to_html("a cost of \\$5 per run");
    assert_eq!(out, "<p>a cost of $5 per run</p>");
}
