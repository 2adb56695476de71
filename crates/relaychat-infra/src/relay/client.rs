//! HttpRelayTransport -- reqwest implementation of [`RelayTransport`].
//!
//! Issues exactly one POST per call with no retries and no client-level
//! timeout; the dispatch engine bounds each attempt and drops the future
//! on expiry, which aborts the request.

use relaychat_core::llm::transport::RelayTransport;
use relaychat_types::llm::{DispatchError, RelayRequest, RelayResponse};

/// Longest slice of an error body kept in a failure message.
const ERROR_BODY_LIMIT: usize = 200;

/// Relay client over a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpRelayTransport {
    client: reqwest::Client,
}

impl HttpRelayTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("relaychat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl RelayTransport for HttpRelayTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn post(
        &self,
        endpoint: &str,
        request: &RelayRequest,
    ) -> Result<RelayResponse, DispatchError> {
        let response = self
            .client
            .post(endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| DispatchError::NetworkFailure {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::NetworkFailure {
                message: format!("failed to read body: {}", e.without_url()),
            })?;

        if !status.is_success() {
            return Err(DispatchError::ProviderFailure {
                status: Some(status.as_u16()),
                message: format!("HTTP {status}: {}", truncate(&body)),
            });
        }

        serde_json::from_str::<RelayResponse>(&body).map_err(|e| DispatchError::ProviderFailure {
            status: Some(status.as_u16()),
            message: format!("malformed response: {e}"),
        })
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}
