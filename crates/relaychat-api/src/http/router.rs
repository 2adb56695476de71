//! Relay router with CORS and request tracing.

use axum::Router;
use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::RelayState;
use super::handlers;

/// Build the relay router. Every path is served by the relay handler.
pub fn build_router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback(handlers::relay::relay)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
