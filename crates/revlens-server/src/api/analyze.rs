//! `POST /api/analyze`: run the review analysis pipeline for one URL.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use revlens_core::Analysis;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub url: Option<String>,
}

/// Responds with the bare [`Analysis`] JSON on success, which is the shape
/// the frontend renders.
pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    // A missing or unreadable body is treated like a missing URL.
    let url = match payload {
        Ok(Json(body)) => body.url.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable analyze request body");
            String::new()
        }
    };

    let cancel = state.shutdown.child_token();
    state
        .analyzer
        .analyze_within(&url, state.analyze_timeout, &cancel)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_analyze(req_id.0, &e))
}
