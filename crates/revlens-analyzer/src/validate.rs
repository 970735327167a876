//! Turning the model's raw text into a checked [`Analysis`].
//!
//! The text is deserialized into the typed record (wrong types, missing
//! fields, or an unknown sentiment label fail here), then numeric ranges are
//! checked. Any failure is [`AnalyzeError::MalformedAnalysis`]; the parser's
//! own message is kept in the error's `detail` for logs only.

use revlens_core::{Analysis, RATING_NOT_AVAILABLE};

use crate::error::AnalyzeError;

/// Highest star rating a product or review can have.
const MAX_STARS: u8 = 5;

/// Distributions further than this from 100 are logged, not rejected.
const DISTRIBUTION_TOLERANCE: u32 = 5;

/// Parses and checks the model's JSON output.
///
/// A single surrounding markdown code fence (```` ```json ... ``` ````) is
/// tolerated even though the system contract forbids it.
///
/// # Errors
///
/// Returns [`AnalyzeError::MalformedAnalysis`] if the text is not JSON, does
/// not have the analysis shape, or has values outside their documented ranges.
pub fn parse_analysis(raw: &str) -> Result<Analysis, AnalyzeError> {
    let body = strip_code_fence(raw);

    let analysis: Analysis = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "model output is not a valid analysis document");
        AnalyzeError::malformed(format!("deserialize: {e}"))
    })?;

    if let Err(detail) = check_ranges(&analysis) {
        tracing::warn!(%detail, "model output has out-of-range values");
        return Err(AnalyzeError::malformed(detail));
    }

    let total = analysis.distribution_total();
    if !analysis.rating_distribution.is_empty() && total.abs_diff(100) > DISTRIBUTION_TOLERANCE {
        tracing::warn!(total, "rating distribution does not sum to 100");
    }

    Ok(analysis)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn check_ranges(analysis: &Analysis) -> Result<(), String> {
    check_rating(analysis)?;

    if analysis.summary.trim().is_empty() {
        return Err("summary is empty".to_owned());
    }

    for theme in analysis.pros.iter().chain(&analysis.cons) {
        check_percentage(&format!("theme \"{}\"", theme.theme), theme.percentage)?;
    }

    for bucket in &analysis.rating_distribution {
        check_stars("ratingDistribution.stars", bucket.stars)?;
        check_percentage(
            &format!("ratingDistribution[{} stars]", bucket.stars),
            bucket.percentage,
        )?;
    }

    for review in analysis
        .top_reviews
        .positive
        .iter()
        .chain(&analysis.top_reviews.negative)
    {
        check_stars("topReviews.rating", review.rating)?;
    }

    Ok(())
}

fn check_rating(analysis: &Analysis) -> Result<(), String> {
    if analysis.rating == RATING_NOT_AVAILABLE {
        return Ok(());
    }
    match analysis.numeric_rating() {
        Some(value) if value.is_finite() && (0.0..=f64::from(MAX_STARS)).contains(&value) => Ok(()),
        Some(value) => Err(format!("rating {value} is outside 0-{MAX_STARS}")),
        None => Err(format!(
            "rating \"{}\" is neither numeric nor \"N/A\"",
            analysis.rating
        )),
    }
}

fn check_stars(field: &str, stars: u8) -> Result<(), String> {
    if (1..=MAX_STARS).contains(&stars) {
        Ok(())
    } else {
        Err(format!("{field} {stars} is outside 1-{MAX_STARS}"))
    }
}

fn check_percentage(field: &str, percentage: u32) -> Result<(), String> {
    if percentage <= 100 {
        Ok(())
    } else {
        Err(format!("{field} percentage {percentage} exceeds 100"))
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
