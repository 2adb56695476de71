//! The relay handler: validate, forward upstream, pass the reply through.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::http::RelayState;
use crate::http::error::RelayError;

/// Forward a POSTed chat-completion request upstream.
///
/// `OPTIONS` gets an empty 200 and other methods a 405. The upstream JSON
/// is returned as-is, including upstream error bodies.
pub async fn relay(
    State(state): State<RelayState>,
    method: Method,
    body: Bytes,
) -> Result<Response, RelayError> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Ok((
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "error": "POST required" })),
        )
            .into_response());
    }

    let request: Value =
        serde_json::from_slice(&body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;
    let model = request
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("(default)");
    tracing::debug!(model = %model, "Relaying chat request");

    let reply = state.upstream.forward(&request).await?;
    Ok(Json(reply).into_response())
}
