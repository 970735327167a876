//! The fixed instruction sent to the model with every request.
//!
//! The contract embeds a complete example of the JSON shape the model must
//! return. It is a compile-time constant; bump [`SYSTEM_CONTRACT_VERSION`]
//! whenever its text changes so logs and the health endpoint show which
//! contract produced an analysis.

use crate::batch::ReviewBatch;

pub const SYSTEM_CONTRACT_VERSION: &str = "2025-10.1";

/// Example response embedded in [`SYSTEM_CONTRACT`].
pub const EXAMPLE_ANALYSIS_JSON: &str = include_str!("contract/example_analysis.json");

pub const SYSTEM_CONTRACT: &str = concat!(
    "You are an expert product review analyst. You will be given a list of raw customer ",
    "reviews for a single product. Your job is to analyze all reviews and return a JSON ",
    "object with the following structure. DO NOT return any text outside of the JSON object ",
    "(e.g., no \"Here is the JSON...\" and no markdown code fences).\n",
    "\n",
    "Field rules:\n",
    "- \"rating\": the average star rating as a string with one decimal (e.g. \"4.1\"), or \"N/A\" if it cannot be determined.\n",
    "- \"totalReviews\": a non-negative integer.\n",
    "- \"overallSentiment\": exactly one of \"Mostly Positive\", \"Mixed\", \"Mostly Negative\", \"Neutral\".\n",
    "- \"summary\": a 2-3 sentence summary of what customers think.\n",
    "- \"keywords\": objects with \"word\", \"mentions\" (non-negative integer) and \"size\" (integer display weight).\n",
    "- \"pros\" / \"cons\": objects with \"theme\", \"percentage\" (integer 0-100) and \"description\".\n",
    "- \"topReviews\": \"positive\" and \"negative\" lists of objects with \"text\", \"rating\" (integer 1-5), \"author\", \"verified\" (boolean) and \"helpful\" (non-negative integer).\n",
    "- \"ratingDistribution\": one object per star level with \"stars\" (integer 1-5) and \"percentage\" (integer 0-100); percentages should sum to 100.\n",
    "- \"insights\": objects with \"topic\" and \"analysis\".\n",
    "\n",
    "Example:\n",
    include_str!("contract/example_analysis.json"),
);

/// Prefix of the user message; the reviews follow as a JSON array.
pub const USER_CONTENT_PREFIX: &str = "Here is the list of reviews: ";

/// Renders the user message for `batch`: [`USER_CONTENT_PREFIX`] followed by
/// the reviews as a JSON array of strings, in batch order.
#[must_use]
pub fn user_content(batch: &ReviewBatch) -> String {
    let reviews = serde_json::Value::from(batch.as_slice().to_vec());
    format!("{USER_CONTENT_PREFIX}{reviews}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_embeds_example_json() {
        assert!(SYSTEM_CONTRACT.contains(EXAMPLE_ANALYSIS_JSON.trim()));
        assert!(SYSTEM_CONTRACT.starts_with("You are an expert product review analyst."));
    }

    #[test]
    fn example_json_is_valid_json() {
        let value: serde_json::Value =
            serde_json::from_str(EXAMPLE_ANALYSIS_JSON).expect("example must parse");
        assert_eq!(value["totalReviews"], 941);
    }

    #[test]
    fn user_content_lists_reviews_as_json_array() {
        let batch = ReviewBatch::new(
            vec!["Love it".to_string(), "Says \"meh\"".to_string()],
            50,
        )
        .expect("non-empty");
        let content = user_content(&batch);
        let json = content
            .strip_prefix(USER_CONTENT_PREFIX)
            .expect("prefix present");
        let parsed: Vec<String> = serde_json::from_str(json).expect("array");
        assert_eq!(parsed, vec!["Love it", "Says \"meh\""]);
    }
}
