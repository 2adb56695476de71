//! BoxRelayTransport -- object-safe dynamic dispatch wrapper for RelayTransport.
//!
//! 1. `RelayTransportDyn` is the object-safe twin with a boxed future
//! 2. Every `T: RelayTransport` gets it through a blanket impl
//! 3. `BoxRelayTransport` owns a `Box<dyn RelayTransportDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use relaychat_types::llm::{DispatchError, RelayRequest, RelayResponse};

use super::transport::RelayTransport;

/// Object-safe version of [`RelayTransport`] with a boxed future.
pub trait RelayTransportDyn: Send + Sync {
    fn name(&self) -> &str;

    fn post_boxed<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a RelayRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RelayResponse, DispatchError>> + Send + 'a>>;
}

impl<T: RelayTransport> RelayTransportDyn for T {
    fn name(&self) -> &str {
        RelayTransport::name(self)
    }

    fn post_boxed<'a>(
        &'a self,
        endpoint: &'a str,
        request: &'a RelayRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RelayResponse, DispatchError>> + Send + 'a>> {
        Box::pin(self.post(endpoint, request))
    }
}

/// Type-erased relay transport.
///
/// Lets the controller hold "some transport" without a type parameter, so the
/// CLI can pick the HTTP client at runtime and tests can swap in a mock.
pub struct BoxRelayTransport {
    inner: Box<dyn RelayTransportDyn>,
}

impl BoxRelayTransport {
    pub fn new<T: RelayTransport + 'static>(transport: T) -> Self {
        Self {
            inner: Box::new(transport),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn post(
        &self,
        endpoint: &str,
        request: &RelayRequest,
    ) -> Result<RelayResponse, DispatchError> {
        self.inner.post_boxed(endpoint, request).await
    }
}

impl std::fmt::Debug for BoxRelayTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxRelayTransport")
            .field("name", &self.name())
            .finish()
    }
}
