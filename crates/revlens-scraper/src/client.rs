//! HTTP client for downloading product pages.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client, Url};
use tokio_util::sync::CancellationToken;

use revlens_core::AppConfig;

use crate::error::ScraperError;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Markup downloaded from a product page.
///
/// Lives only for the duration of one analysis run.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// The URL that was requested (not the post-redirect URL).
    pub url: String,
    pub html: String,
}

/// HTTP client for product pages.
///
/// Sends a browser-like `User-Agent`, `Accept-Language`, and
/// `Accept-Encoding` (added by reqwest for the enabled decoders). No cookie
/// store is configured, so nothing persists between fetches. The inner
/// `reqwest::Client` pools connections and is safe to share across tasks.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Creates a `PageClient` with the given timeout, `User-Agent`, and
    /// redirect cap.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config or user agent).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_redirects: usize,
    ) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(max_redirects))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a `PageClient` from the `REVLENS_FETCH_*` settings.
    ///
    /// # Errors
    ///
    /// See [`PageClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.fetch_timeout_secs,
            &config.fetch_user_agent,
            config.fetch_max_redirects,
        )
    }

    /// Downloads `url` with a single GET and returns its body as text.
    ///
    /// No retries are attempted. Cancelling `cancel` aborts the request or
    /// body read in flight.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`ScraperError::UnexpectedStatus`]: any non-2xx status after redirects.
    /// - [`ScraperError::Http`]: DNS, connect, TLS, redirect-limit, or timeout failure.
    /// - [`ScraperError::Cancelled`]: `cancel` fired before the body was read.
    pub async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<RawPage, ScraperError> {
        let parsed = parse_page_url(url)?;

        if cancel.is_cancelled() {
            return Err(ScraperError::Cancelled {
                url: url.to_owned(),
            });
        }

        tracing::info!(url, "fetching product page");

        let response = tokio::select! {
            result = self.client.get(parsed).send() => result?,
            () = cancel.cancelled() => {
                tracing::warn!(url, "page request cancelled");
                return Err(ScraperError::Cancelled { url: url.to_owned() });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let html = tokio::select! {
            result = response.text() => result?,
            () = cancel.cancelled() => {
                tracing::warn!(url, "page body read cancelled");
                return Err(ScraperError::Cancelled { url: url.to_owned() });
            }
        };

        tracing::debug!(url, bytes = html.len(), "fetched product page");
        Ok(RawPage {
            url: url.to_owned(),
            html,
        })
    }
}

/// Parses `url` and checks that it is an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] otherwise.
pub fn parse_page_url(url: &str) -> Result<Url, ScraperError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{other}\""),
        }),
    }
}
