//! Relay error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use relaychat_infra::relay::upstream::UpstreamError;

/// Anything that stops a request from being relayed.
///
/// Every variant becomes a 500 with `{"error": "Worker error: ..."}`,
/// which is what relaychat clients expect from a failing relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Relay request failed");
        let body = json!({ "error": format!("Worker error: {self}") });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
