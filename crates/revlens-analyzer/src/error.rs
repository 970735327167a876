use serde::Serialize;
use thiserror::Error;

use revlens_scraper::ScraperError;

use crate::pipeline::Stage;

/// Errors from the Gemini `generateContent` client.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Key is empty or still the sample placeholder. Raised before any
    /// network call.
    #[error("Gemini API key is missing or is the placeholder value")]
    MissingCredential,

    /// The endpoint answered with a non-2xx status.
    #[error("Gemini API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A 2xx response without any candidate text.
    #[error("Gemini response contained no candidate text")]
    EmptyResponse,

    /// A 2xx response whose envelope is not the expected JSON.
    #[error("Gemini response envelope could not be decoded: {source}")]
    Envelope {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Gemini endpoint \"{base_url}\": {reason}")]
    InvalidEndpoint { base_url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini request cancelled")]
    Cancelled,
}

/// Errors building an [`Analyzer`](crate::Analyzer) at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Stable, machine-readable classification of an [`AnalyzeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    FetchError,
    NoReviewsFound,
    UpstreamAuthError,
    UpstreamApiError,
    UpstreamTransportError,
    MalformedAnalysis,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::FetchError => "fetch_error",
            ErrorKind::NoReviewsFound => "no_reviews_found",
            ErrorKind::UpstreamAuthError => "upstream_auth_error",
            ErrorKind::UpstreamApiError => "upstream_api_error",
            ErrorKind::UpstreamTransportError => "upstream_transport_error",
            ErrorKind::MalformedAnalysis => "malformed_analysis",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way an analysis run can fail.
///
/// `Display` is the caller-facing message. It never includes parser or
/// transport error text; those stay reachable through `source()` for logs.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Failed to fetch the product page: {detail}.")]
    Fetch {
        url: String,
        detail: String,
        #[source]
        source: ScraperError,
    },

    #[error(
        "Could not find any reviews. The selector is likely wrong or the site blocked the request."
    )]
    NoReviewsFound { selector: String },

    #[error("Invalid API key: set GEMINI_API_KEY to a valid Gemini API key.")]
    UpstreamAuth,

    #[error("AI API Error: {message}")]
    UpstreamApi { status: Option<u16>, message: String },

    #[error("Failed to communicate with the Gemini API.")]
    UpstreamTransport {
        #[source]
        source: ModelError,
    },

    #[error("The AI returned an analysis that could not be understood.")]
    MalformedAnalysis { detail: String },

    /// The caller's overall deadline ran out.
    #[error("Timed out while {stage}.")]
    Timeout { stage: Stage },

    /// The caller's cancellation token fired.
    #[error("Analysis cancelled while {stage}.")]
    Cancelled { stage: Stage },
}

pub(crate) const URL_REQUIRED: &str = "URL is required.";

impl AnalyzeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzeError::Validation { .. } => ErrorKind::ValidationError,
            AnalyzeError::Fetch { .. } => ErrorKind::FetchError,
            AnalyzeError::NoReviewsFound { .. } => ErrorKind::NoReviewsFound,
            AnalyzeError::UpstreamAuth => ErrorKind::UpstreamAuthError,
            AnalyzeError::UpstreamApi { .. } => ErrorKind::UpstreamApiError,
            AnalyzeError::UpstreamTransport { .. } => ErrorKind::UpstreamTransportError,
            AnalyzeError::MalformedAnalysis { .. } => ErrorKind::MalformedAnalysis,
            AnalyzeError::Timeout { .. } => ErrorKind::Timeout,
            AnalyzeError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AnalyzeError::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        AnalyzeError::MalformedAnalysis {
            detail: detail.into(),
        }
    }

    /// Classifies a page fetch or extraction failure.
    ///
    /// The page client's own timeout is a fetch failure; only the caller's
    /// deadline produces [`AnalyzeError::Timeout`].
    pub(crate) fn from_scraper(err: ScraperError, stage: Stage) -> Self {
        match err {
            ScraperError::InvalidUrl { .. } => {
                AnalyzeError::validation("URL must be an absolute http:// or https:// address.")
            }
            ScraperError::NoReviewsFound { selector }
            // Selectors are parsed at startup, so this cannot come from a page.
            | ScraperError::InvalidSelector { selector, .. } => {
                AnalyzeError::NoReviewsFound { selector }
            }
            ScraperError::Cancelled { .. } => AnalyzeError::Cancelled { stage },
            ScraperError::UnexpectedStatus { status, ref url } => AnalyzeError::Fetch {
                url: url.clone(),
                detail: format!("the page returned HTTP {status}"),
                source: err,
            },
            ScraperError::Http(ref e) => {
                let detail = if err.is_timeout() {
                    "the request timed out"
                } else if e.is_redirect() {
                    "too many redirects"
                } else if e.is_connect() {
                    "could not connect to the site"
                } else if e.is_decode() || e.is_body() {
                    "the page body could not be read"
                } else {
                    "the request failed"
                };
                AnalyzeError::Fetch {
                    url: e.url().map(ToString::to_string).unwrap_or_default(),
                    detail: detail.to_owned(),
                    source: err,
                }
            }
        }
    }

    /// Classifies a model request failure. A client-side timeout is a
    /// transport failure like any other network error.
    pub(crate) fn from_model(err: ModelError) -> Self {
        match err {
            ModelError::MissingCredential => AnalyzeError::UpstreamAuth,
            ModelError::Api { status, message } => AnalyzeError::UpstreamApi {
                status: Some(status),
                message,
            },
            ModelError::EmptyResponse => AnalyzeError::UpstreamApi {
                status: None,
                message: "the model returned no analysis".to_owned(),
            },
            ModelError::Envelope { .. } => AnalyzeError::UpstreamApi {
                status: None,
                message: "the model returned an unreadable response".to_owned(),
            },
            ModelError::Cancelled => AnalyzeError::Cancelled {
                stage: Stage::Requesting,
            },
            ModelError::Http(_) | ModelError::InvalidEndpoint { .. } => {
                AnalyzeError::UpstreamTransport { source: err }
            }
        }
    }
}
