pub mod analysis;
pub mod app_config;
pub mod config;

pub use analysis::{
    Analysis, Insight, Keyword, OverallSentiment, RatingBucket, ReviewSample, Theme, TopReviews,
    RATING_NOT_AVAILABLE,
};
pub use app_config::{AppConfig, Environment, PLACEHOLDER_API_KEY};
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_FETCH_USER_AGENT, DEFAULT_MODEL,
    DEFAULT_MODEL_BASE_URL, DEFAULT_REVIEW_SELECTOR,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
