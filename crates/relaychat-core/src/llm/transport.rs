//! RelayTransport trait definition.
//!
//! The one seam between the dispatch engine and the network. A transport
//! POSTs a single request to a single relay endpoint and classifies the
//! outcome; it never retries and never chooses another model.

use relaychat_types::llm::{DispatchError, RelayRequest, RelayResponse};

/// Trait for relay clients.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// The HTTP implementation (`HttpRelayTransport`) lives in relaychat-infra.
pub trait RelayTransport: Send + Sync {
    /// Short name used in logs (e.g. "http").
    fn name(&self) -> &str;

    /// POST `request` as JSON to `endpoint` and decode the reply body.
    ///
    /// Connection failures map to [`DispatchError::NetworkFailure`], non-2xx
    /// statuses and undecodable bodies to [`DispatchError::ProviderFailure`].
    /// Whether the body carries usable content is judged by the caller.
    fn post(
        &self,
        endpoint: &str,
        request: &RelayRequest,
    ) -> impl std::future::Future<Output = Result<RelayResponse, DispatchError>> + Send;
}
