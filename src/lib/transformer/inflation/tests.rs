use super::adjust_text;

#[test]
fn amount_with_year_gains_present_day_equivalent() {
    // 100 × 304.7 / 53.8 ≈ 566.
    assert_eq!(
        adjust_text("a grant of $100 (1975) per subject"),
        "a grant of $100 (1975; \u{2248}$566 in 2023) per subject"
    );
}

#[test]
fn thousands_are_grouped() {
    // 5,000 × 304.7 / 24.1 ≈ 63,216.
    assert_eq!(
        adjust_text("$5,000 (1950)"),
        "$5,000 (1950; \u{2248}$63,216 in 2023)"
    );
}

#[test]
fn adjustment_is_idempotent() {
    let once = adjust_text("paid $100 (1975) upfront");
    assert_eq!(adjust_text(&once), once);
}

#[test]
fn unknown_years_and_bare_amounts_are_left_alone() {
    assert_eq!(adjust_text("$100 (1875)"), "$100 (1875)");
    assert_eq!(adjust_text("$100 in total"), "$100 in total");
    assert_eq!(adjust_text("(1975) alone"), "(1975) alone");
}

#[test]
fn reference_year_amounts_stay_equal() {
    assert_eq!(adjust_text("$50 (2023)"), "$50 (2023; \u{2248}$50 in 2023)");
}
