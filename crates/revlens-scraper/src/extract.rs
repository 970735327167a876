//! Review text extraction from product page markup.

use scraper::{Html, Selector};

use revlens_core::DEFAULT_REVIEW_SELECTOR;

use crate::error::ScraperError;

/// A validated CSS selector locating review text nodes.
///
/// Parsed once at startup; a syntax error is a configuration mistake and is
/// reported then, never while handling a page.
#[derive(Debug, Clone)]
pub struct ReviewSelector {
    raw: String,
    selector: Selector,
}

impl ReviewSelector {
    /// Parses a CSS selector string.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `raw` is empty or is not
    /// valid selector syntax.
    pub fn parse(raw: &str) -> Result<Self, ScraperError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScraperError::InvalidSelector {
                selector: raw.to_owned(),
                reason: "selector is empty".to_owned(),
            });
        }

        let selector = Selector::parse(trimmed).map_err(|e| ScraperError::InvalidSelector {
            selector: raw.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: trimmed.to_owned(),
            selector,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for ReviewSelector {
    fn default() -> Self {
        Self::parse(DEFAULT_REVIEW_SELECTOR).expect("default review selector is valid")
    }
}

impl std::fmt::Display for ReviewSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Collects the trimmed text of every element matching `selector`, in
/// document order.
///
/// Each matched element contributes its full descendant text. Elements whose
/// trimmed text is empty are skipped entirely; every other element yields
/// exactly one entry.
///
/// # Errors
///
/// Returns [`ScraperError::NoReviewsFound`] when no matched element has
/// non-empty text, including when nothing matched at all.
pub fn extract_reviews(html: &str, selector: &ReviewSelector) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(html);

    let mut matched = 0usize;
    let reviews: Vec<String> = document
        .select(&selector.selector)
        .inspect(|_| matched += 1)
        .map(|element| element.text().collect::<String>().trim().to_owned())
        .filter(|text| !text.is_empty())
        .collect();

    tracing::info!(
        selector = %selector,
        matched,
        kept = reviews.len(),
        "extracted review elements"
    );

    if reviews.is_empty() {
        return Err(ScraperError::NoReviewsFound {
            selector: selector.raw.clone(),
        });
    }

    Ok(reviews)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
