//! Scripted relay transport for engine and controller tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use relaychat_types::llm::{DispatchError, RelayRequest, RelayResponse};

use super::transport::RelayTransport;

/// What the mock does when a given model is requested.
#[derive(Debug, Clone)]
pub enum MockReply {
    Content(String),
    Fail(DispatchError),
    /// Never answers; only a timeout ends the attempt.
    Hang,
    /// Answers with `content` after `delay`.
    Delayed(Duration, String),
}

/// Transport that answers per model from a script and logs every call.
///
/// Models missing from the script fail with a provider error.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: HashMap<String, MockReply>,
    calls: Arc<Mutex<Vec<RelayRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, model: &str, reply: MockReply) -> Self {
        self.script.insert(model.to_string(), reply);
        self
    }

    /// Shared handle to the call log; stays valid after the mock is boxed.
    pub fn calls(&self) -> Arc<Mutex<Vec<RelayRequest>>> {
        Arc::clone(&self.calls)
    }
}

/// Model names in call order.
pub fn called_models(calls: &Arc<Mutex<Vec<RelayRequest>>>) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.model.clone())
        .collect()
}

impl RelayTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn post(
        &self,
        _endpoint: &str,
        request: &RelayRequest,
    ) -> Result<RelayResponse, DispatchError> {
        self.calls.lock().unwrap().push(request.clone());
        match self.script.get(&request.model).cloned() {
            Some(MockReply::Content(content)) => Ok(RelayResponse::with_content(content)),
            Some(MockReply::Fail(err)) => Err(err),
            Some(MockReply::Hang) => std::future::pending().await,
            Some(MockReply::Delayed(delay, content)) => {
                tokio::time::sleep(delay).await;
                Ok(RelayResponse::with_content(content))
            }
            None => Err(DispatchError::ProviderFailure {
                status: Some(503),
                message: format!("no script for {}", request.model),
            }),
        }
    }
}
