mod analyze;
#[cfg(test)]
mod test_support;

use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use revlens_analyzer::{AnalyzeError, Analyzer, ErrorKind};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// Overall deadline for one `POST /api/analyze` run.
    pub analyze_timeout: Duration,
    /// Cancelled on shutdown; every run uses a child of it.
    pub shutdown: CancellationToken,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Error body: `{"error": <message>, "kind": <kind>, "requestId": <id>}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
    pub kind: String,
    pub request_id: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct HealthData {
    status: &'static str,
    contract_version: &'static str,
    model: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: message.into(),
            kind: kind.into(),
            request_id: request_id.into(),
        }
    }

    /// Renders a pipeline failure. Only the error's display message reaches
    /// the caller; source errors are logged here.
    pub fn from_analyze(request_id: impl Into<String>, err: &AnalyzeError) -> Self {
        let kind = err.kind();
        if server_side(kind) {
            let source = std::error::Error::source(err).map(ToString::to_string);
            tracing::error!(%kind, error = %err, source = ?source, "analysis failed");
        } else {
            tracing::info!(%kind, error = %err, "analysis rejected");
        }
        Self::new(request_id, kind.as_str(), err.to_string())
    }

    fn status(&self) -> StatusCode {
        match self.kind.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "no_reviews_found" | "not_found" => StatusCode::NOT_FOUND,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

fn server_side(kind: ErrorKind) -> bool {
    !matches!(kind, ErrorKind::ValidationError | ErrorKind::NoReviewsFound)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

fn analyze_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze::analyze))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

/// Builds the full application router.
///
/// With `static_dir`, unknown non-API paths are served from that directory,
/// falling back to its `index.html` so client-side routes resolve.
pub fn build_app(
    state: AppState,
    rate_limit: RateLimitState,
    static_dir: Option<&Path>,
) -> Router {
    let mut app = Router::new()
        .route("/api/health", get(health))
        .route("/api/{*rest}", any(not_found))
        .merge(analyze_router(rate_limit));

    app = match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "serving static frontend");
            let index = ServeFile::new(dir.join("index.html"));
            app.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => app.fallback(not_found),
    };

    app.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(build_cors())
            .layer(CompressionLayer::new()),
    )
    .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            contract_version: state.analyzer.contract_version(),
            model: state.analyzer.model_name().to_owned(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn not_found(req_id: Option<Extension<RequestId>>) -> ApiError {
    let request_id = req_id.map(|Extension(id)| id.0).unwrap_or_default();
    ApiError::new(request_id, "not_found", "Not found.")
}
