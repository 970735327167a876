//! The structured review analysis returned to callers.
//!
//! Field names serialize in camelCase to match the JSON shape the model is
//! instructed to produce and the frontend consumes.

use serde::{Deserialize, Serialize};

/// Literal used for [`Analysis::rating`] when the model cannot infer one.
pub const RATING_NOT_AVAILABLE: &str = "N/A";

/// Structured analysis of one product's reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Average star rating as a decimal string (e.g. `"4.1"`) or `"N/A"`.
    pub rating: String,
    pub total_reviews: u64,
    pub overall_sentiment: OverallSentiment,
    pub summary: String,
    pub keywords: Vec<Keyword>,
    pub pros: Vec<Theme>,
    pub cons: Vec<Theme>,
    pub top_reviews: TopReviews,
    pub rating_distribution: Vec<RatingBucket>,
    pub insights: Vec<Insight>,
}

impl Analysis {
    /// Parses [`Analysis::rating`] as a number, or `None` for `"N/A"`.
    #[must_use]
    pub fn numeric_rating(&self) -> Option<f64> {
        if self.rating == RATING_NOT_AVAILABLE {
            return None;
        }
        self.rating.trim().parse::<f64>().ok()
    }

    /// Sum of all [`RatingBucket::percentage`] values.
    #[must_use]
    pub fn distribution_total(&self) -> u32 {
        self.rating_distribution.iter().map(|b| b.percentage).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallSentiment {
    #[serde(rename = "Mostly Positive")]
    MostlyPositive,
    Mixed,
    #[serde(rename = "Mostly Negative")]
    MostlyNegative,
    Neutral,
}

impl std::fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallSentiment::MostlyPositive => write!(f, "Mostly Positive"),
            OverallSentiment::Mixed => write!(f, "Mixed"),
            OverallSentiment::MostlyNegative => write!(f, "Mostly Negative"),
            OverallSentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// A frequently mentioned word or phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub mentions: u32,
    /// Relative display weight for word-cloud rendering.
    pub size: i32,
}

/// A recurring pro or con.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub theme: String,
    /// Share of reviews raising this theme, 0–100.
    pub percentage: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopReviews {
    pub positive: Vec<ReviewSample>,
    pub negative: Vec<ReviewSample>,
}

/// A representative review picked by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSample {
    pub text: String,
    /// Star rating, 1–5.
    pub rating: u8,
    pub author: String,
    pub verified: bool,
    pub helpful: u32,
}

/// Share of reviews at one star level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBucket {
    /// 1–5.
    pub stars: u8,
    /// 0–100.
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub topic: String,
    pub analysis: String,
}
