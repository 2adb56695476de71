//! Relay HTTP server.
//!
//! A single axum service that accepts chat-completion requests from
//! relaychat clients on any path and forwards them upstream with the
//! server-side API key. CORS is open so browser clients can call it too.

use std::sync::Arc;

use relaychat_infra::relay::upstream::UpstreamClient;

pub mod error;
pub mod handlers;
pub mod router;

/// Shared state of the relay handlers.
#[derive(Clone)]
pub struct RelayState {
    pub upstream: Arc<UpstreamClient>,
}
