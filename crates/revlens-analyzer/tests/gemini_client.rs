//! Integration tests for `GeminiClient` using wiremock HTTP mocks.

use std::time::Duration;

use revlens_analyzer::{GeminiClient, ModelError, ReviewBatch, SYSTEM_CONTRACT};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn test_client(server: &MockServer, timeout_secs: u64) -> GeminiClient {
    GeminiClient::with_base_url(
        "test-key",
        "gemini-test",
        timeout_secs,
        &format!("{}/v1beta/", server.uri()),
    )
    .expect("client construction should not fail")
}

fn batch(n: usize) -> ReviewBatch {
    ReviewBatch::new((0..n).map(|i| format!("review {i}")).collect(), 50).expect("non-empty")
}

fn reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 10 }
    })
}

#[tokio::test]
async fn generate_returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(r#"{"rating":"4.0"}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let text = test_client(&server, 5)
        .generate(&batch(3), &CancellationToken::new())
        .await
        .expect("should return text");

    assert_eq!(text, r#"{"rating":"4.0"}"#);
}

#[tokio::test]
async fn payload_carries_contract_and_reviews_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("{}")))
        .mount(&server)
        .await;

    test_client(&server, 5)
        .generate(&batch(4), &CancellationToken::new())
        .await
        .expect("should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().expect("json body");

    assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_CONTRACT);
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");

    let user_text = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("user text");
    let reviews: Vec<String> = serde_json::from_str(
        user_text
            .strip_prefix("Here is the list of reviews: ")
            .expect("prefix"),
    )
    .expect("reviews array");
    assert_eq!(reviews, vec!["review 0", "review 1", "review 2", "review 3"]);
}

#[tokio::test]
async fn api_error_carries_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server, 5)
        .generate(&batch(1), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ModelError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn api_error_without_envelope_uses_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = test_client(&server, 5)
        .generate(&batch(1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            ModelError::Api { status: 500, ref message } if message == "Internal Server Error"
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn no_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server, 5)
        .generate(&batch(1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::EmptyResponse), "got: {err:?}");
}

#[tokio::test]
async fn non_json_success_body_is_envelope_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server, 5)
        .generate(&batch(1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::Envelope { .. }), "got: {err:?}");
}

#[tokio::test]
async fn slow_model_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = test_client(&server, 1)
        .generate(&batch(1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ModelError::Http(ref e) if e.is_timeout()),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn cancellation_aborts_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("{}"))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = test_client(&server, 30)
        .generate(&batch(1), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::Cancelled), "got: {err:?}");
}

#[tokio::test]
async fn placeholder_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(
        revlens_core::PLACEHOLDER_API_KEY,
        "gemini-test",
        5,
        &format!("{}/v1beta/", server.uri()),
    )
    .expect("client");

    let err = client
        .generate(&batch(1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::MissingCredential));
}
