use super::*;

fn review_page(bodies: &[&str]) -> String {
    let items: String = bodies
        .iter()
        .map(|b| {
            format!(
                r#"<div class="review"><span class="a-profile-name">Someone</span><div data-hook="review-body"><span>{b}</span></div></div>"#
            )
        })
        .collect();
    format!("<html><body><div id=\"reviews\">{items}</div></body></html>")
}

#[test]
fn default_selector_matches_review_body_spans() {
    let html = review_page(&["Great screen.", "Battery died in a week."]);
    let reviews = extract_reviews(&html, &ReviewSelector::default()).unwrap();
    assert_eq!(reviews, vec!["Great screen.", "Battery died in a week."]);
}

#[test]
fn text_is_trimmed() {
    let html = review_page(&["\n      Solid build quality.   \n"]);
    let reviews = extract_reviews(&html, &ReviewSelector::default()).unwrap();
    assert_eq!(reviews, vec!["Solid build quality."]);
}

#[test]
fn whitespace_only_nodes_are_dropped() {
    let html = review_page(&["First", "   ", "\n\t", "Second"]);
    let reviews = extract_reviews(&html, &ReviewSelector::default()).unwrap();
    assert_eq!(reviews, vec!["First", "Second"]);
}

#[test]
fn preserves_document_order() {
    let bodies: Vec<String> = (0..25).map(|i| format!("review number {i}")).collect();
    let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
    let html = review_page(&refs);
    let reviews = extract_reviews(&html, &ReviewSelector::default()).unwrap();
    assert_eq!(reviews.len(), 25);
    assert_eq!(reviews, bodies);
}

#[test]
fn nested_markup_text_is_concatenated() {
    let html = r#"<div data-hook="review-body"><span>Works <b>really</b> well</span></div>"#;
    let reviews = extract_reviews(html, &ReviewSelector::default()).unwrap();
    assert_eq!(reviews, vec!["Works really well"]);
}

#[test]
fn page_without_matches_is_no_reviews_found() {
    let html = "<html><body><p>No reviews yet.</p></body></html>";
    let err = extract_reviews(html, &ReviewSelector::default()).unwrap_err();
    assert!(
        matches!(
            err,
            ScraperError::NoReviewsFound { ref selector } if selector == DEFAULT_REVIEW_SELECTOR
        ),
        "expected NoReviewsFound, got: {err:?}"
    );
}

#[test]
fn page_with_only_empty_matches_is_no_reviews_found() {
    let html = review_page(&["", "  "]);
    let err = extract_reviews(&html, &ReviewSelector::default()).unwrap_err();
    assert!(matches!(err, ScraperError::NoReviewsFound { .. }));
}

#[test]
fn empty_document_is_no_reviews_found() {
    let err = extract_reviews("", &ReviewSelector::default()).unwrap_err();
    assert!(matches!(err, ScraperError::NoReviewsFound { .. }));
}

#[test]
fn custom_selector_is_honoured() {
    let html = r#"<ul><li class="review-text">One</li><li class="other">Skip</li><li class="review-text">Two</li></ul>"#;
    let selector = ReviewSelector::parse(".review-text").unwrap();
    let reviews = extract_reviews(html, &selector).unwrap();
    assert_eq!(reviews, vec!["One", "Two"]);
}

#[test]
fn malformed_markup_is_still_parsed() {
    let html = r#"<div data-hook="review-body"><span>Unclosed tags <p>still fine"#;
    let reviews = extract_reviews(html, &ReviewSelector::default()).unwrap();
    assert_eq!(reviews.len(), 1);
    assert!(reviews[0].starts_with("Unclosed tags"));
}

#[test]
fn invalid_selector_syntax_is_rejected() {
    let err = ReviewSelector::parse("div[[").unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidSelector { ref selector, .. } if selector == "div[["),
        "expected InvalidSelector, got: {err:?}"
    );
}

#[test]
fn empty_selector_is_rejected() {
    let err = ReviewSelector::parse("   ").unwrap_err();
    assert!(matches!(err, ScraperError::InvalidSelector { .. }));
}

#[test]
fn selector_displays_its_source() {
    let selector = ReviewSelector::parse("  .review  ").unwrap();
    assert_eq!(selector.as_str(), ".review");
    assert_eq!(selector.to_string(), ".review");
}
