//! HTTP client for the Gemini `generateContent` API.
//!
//! One request per analysis run, never retried: the call is billed per
//! request, so retrying is left to whoever invoked the pipeline.

pub mod types;

use std::time::Duration;

use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;

use revlens_core::{AppConfig, DEFAULT_MODEL_BASE_URL, PLACEHOLDER_API_KEY};

use crate::batch::ReviewBatch;
use crate::contract::{user_content, SYSTEM_CONTRACT};
use crate::error::ModelError;

use self::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

/// Client for one Gemini model.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ModelError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_MODEL_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ModelError::InvalidEndpoint`] if
    /// `base_url` and `model` do not form a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("revlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Normalise to exactly one trailing slash so `join` appends to the
        // base path rather than replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(&format!("models/{model}:generateContent")))
            .map_err(|e| ModelError::InvalidEndpoint {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_owned(),
            model: model.to_owned(),
            endpoint,
        })
    }

    /// Creates a client from the `GEMINI_API_KEY` and `REVLENS_MODEL*` settings.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ModelError> {
        Self::with_base_url(
            &config.gemini_api_key,
            &config.model,
            config.model_timeout_secs,
            &config.model_base_url,
        )
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns `false` when the key is empty or the sample placeholder.
    #[must_use]
    pub fn has_usable_credential(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }

    /// Builds the request body for `batch`: the fixed system contract, the
    /// reviews as the single user turn, and a JSON response type.
    #[must_use]
    pub fn build_request(batch: &ReviewBatch) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(user_content(batch))],
            system_instruction: Content::text(SYSTEM_CONTRACT),
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_owned(),
            },
        }
    }

    /// Sends `batch` to the model and returns the raw analysis text.
    ///
    /// The credential is checked before anything goes on the wire. The text
    /// returned is whatever the model produced; parsing it is the caller's
    /// job (see [`crate::validate::parse_analysis`]).
    ///
    /// # Errors
    ///
    /// - [`ModelError::MissingCredential`]: key empty or placeholder (no request sent).
    /// - [`ModelError::Api`]: non-2xx status, with the upstream error message when present.
    /// - [`ModelError::Envelope`]: 2xx body is not a `generateContent` response.
    /// - [`ModelError::EmptyResponse`]: 2xx body without candidate text.
    /// - [`ModelError::Http`]: network, TLS, or timeout failure.
    /// - [`ModelError::Cancelled`]: `cancel` fired before the response was read.
    pub async fn generate(
        &self,
        batch: &ReviewBatch,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        if !self.has_usable_credential() {
            return Err(ModelError::MissingCredential);
        }
        if cancel.is_cancelled() {
            return Err(ModelError::Cancelled);
        }

        let payload = Self::build_request(batch);
        tracing::info!(
            model = %self.model,
            reviews = batch.len(),
            "sending reviews to Gemini for analysis"
        );

        let request = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send();

        let response = tokio::select! {
            result = request => result?,
            () = cancel.cancelled() => {
                tracing::warn!(model = %self.model, "Gemini request cancelled");
                return Err(ModelError::Cancelled);
            }
        };

        let status = response.status();
        let body = tokio::select! {
            result = response.text() => result?,
            () = cancel.cancelled() => {
                tracing::warn!(model = %self.model, "Gemini response read cancelled");
                return Err(ModelError::Cancelled);
            }
        };

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_owned()
                },
                |envelope| envelope.error.message,
            );
            tracing::warn!(status = status.as_u16(), %message, "Gemini API returned an error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ModelError::Envelope { source: e })?;
        let text = parsed.first_text().ok_or(ModelError::EmptyResponse)?;

        tracing::info!(model = %self.model, chars = text.len(), "received Gemini analysis");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(texts: &[&str]) -> ReviewBatch {
        ReviewBatch::new(texts.iter().map(|s| (*s).to_string()).collect(), 50)
            .expect("non-empty")
    }

    #[test]
    fn endpoint_appends_model_path() {
        let client =
            GeminiClient::with_base_url("k", "gemini-test", 5, "http://localhost:1234/v1beta")
                .unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://localhost:1234/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slashes() {
        let client =
            GeminiClient::with_base_url("k", "gemini-test", 5, "http://localhost:1234/v1beta//")
                .unwrap();
        assert_eq!(
            client.endpoint().path(),
            "/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn production_endpoint_is_generative_language_api() {
        let client = GeminiClient::new("k", "gemini-2.5-flash", 5).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = GeminiClient::with_base_url("k", "m", 5, "not a url").unwrap_err();
        assert!(matches!(err, ModelError::InvalidEndpoint { .. }));
    }

    #[test]
    fn placeholder_key_is_not_usable() {
        let client = GeminiClient::new(PLACEHOLDER_API_KEY, "m", 5).unwrap();
        assert!(!client.has_usable_credential());
        let blank = GeminiClient::new("   ", "m", 5).unwrap();
        assert!(!blank.has_usable_credential());
        let real = GeminiClient::new("AIza-test", "m", 5).unwrap();
        assert!(real.has_usable_credential());
    }

    #[test]
    fn debug_redacts_key() {
        let client = GeminiClient::new("super-secret", "m", 5).unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[test]
    fn request_body_has_expected_shape() {
        let body = serde_json::to_value(GeminiClient::build_request(&batch(&["a", "b"]))).unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            SYSTEM_CONTRACT
        );
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "Here is the list of reviews: [\"a\",\"b\"]"
        );
    }

    #[tokio::test]
    async fn generate_fails_fast_without_credential() {
        // Unroutable endpoint: any network attempt would surface as Http, not MissingCredential.
        let client =
            GeminiClient::with_base_url(PLACEHOLDER_API_KEY, "m", 1, "http://127.0.0.1:9/")
                .unwrap();
        let err = client
            .generate(&batch(&["a"]), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingCredential));
    }

    #[test]
    fn first_text_joins_parts_of_first_candidate() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn first_text_is_none_without_candidates() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}}))
                .unwrap();
        assert!(parsed.first_text().is_none());
    }
}
