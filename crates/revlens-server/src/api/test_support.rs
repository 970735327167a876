use std::{path::Path, sync::Arc, time::Duration};

use axum::{body::to_bytes, response::Response, Router};
use tokio_util::sync::CancellationToken;

use revlens_analyzer::{Analyzer, GeminiClient};
use revlens_core::DEFAULT_FETCH_USER_AGENT;
use revlens_scraper::{PageClient, ReviewSelector};

use super::{build_app, AppState};
use crate::middleware::RateLimitState;

/// State whose model endpoint lives under `server_uri` (a wiremock server).
pub(super) fn test_state(server_uri: &str) -> AppState {
    let pages = PageClient::new(5, DEFAULT_FETCH_USER_AGENT, 5).expect("page client");
    let model = GeminiClient::with_base_url(
        "test-key",
        "gemini-test",
        5,
        &format!("{server_uri}/v1beta/"),
    )
    .expect("model client");
    AppState {
        analyzer: Arc::new(Analyzer::new(pages, model, ReviewSelector::default(), 50)),
        analyze_timeout: Duration::from_secs(10),
        shutdown: CancellationToken::new(),
    }
}

pub(super) fn test_app(state: AppState, per_minute: usize, static_dir: Option<&Path>) -> Router {
    build_app(
        state,
        RateLimitState::new(per_minute, Duration::from_secs(60)),
        static_dir,
    )
}

pub(super) async fn body_json(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}
