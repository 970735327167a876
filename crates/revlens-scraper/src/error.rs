use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid page URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid review selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no non-empty review text matched selector \"{selector}\"")]
    NoReviewsFound { selector: String },

    #[error("page fetch cancelled for {url}")]
    Cancelled { url: String },
}

impl ScraperError {
    /// Returns `true` if the underlying transport gave up because a
    /// configured timeout elapsed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScraperError::Http(e) if e.is_timeout())
    }
}
