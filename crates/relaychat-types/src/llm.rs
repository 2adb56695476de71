//! Relay request/response types and dispatch outcomes for relaychat.
//!
//! These types model the data shapes exchanged with the relay endpoint,
//! the ranked model candidates the dispatch engine walks through, and the
//! errors an attempt or a whole dispatch can end in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message sent to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for PromptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptRole::System => write!(f, "system"),
            PromptRole::User => write!(f, "user"),
            PromptRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for PromptRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(PromptRole::System),
            "user" => Ok(PromptRole::User),
            "assistant" => Ok(PromptRole::Assistant),
            other => Err(format!("invalid prompt role: '{other}'")),
        }
    }
}

/// A single message in a relay request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body POSTed to the relay: `{"model": ..., "messages": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
}

/// Decoded relay success body: `{"choices":[{"message":{"content": ...}}]}`.
///
/// Every level is optional so that a well-formed but unexpected body decodes
/// and is then judged by [`RelayResponse::first_content`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    #[serde(default)]
    pub choices: Vec<RelayChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayChoice {
    #[serde(default)]
    pub message: Option<RelayChoiceMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl RelayResponse {
    /// Build a response carrying a single choice with the given content.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![RelayChoice {
                message: Some(RelayChoiceMessage {
                    content: Some(content.into()),
                }),
            }],
        }
    }

    /// `choices[0].message.content`, if present and not blank.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}

/// One (relay endpoint, model) pair the dispatch engine may try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub endpoint: String,
    pub model: String,
}

impl ModelCandidate {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSuccess {
    /// Reply text from `choices[0].message.content`.
    pub content: String,
    /// Model of the candidate that answered.
    pub model_used: String,
    /// Endpoint of the candidate that answered.
    pub endpoint: String,
    /// Number of candidates attempted, including the successful one.
    pub attempts: usize,
}

/// Errors from a single relay attempt or from a whole dispatch.
///
/// Only [`DispatchError::AllCandidatesExhausted`] ever leaves the dispatch
/// engine; the other variants describe individual candidate failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("network failure: {message}")]
    NetworkFailure { message: String },

    #[error("timed out after {after_ms}ms")]
    TimedOut { after_ms: u64 },

    #[error("provider failure: {message}")]
    ProviderFailure {
        status: Option<u16>,
        message: String,
    },

    #[error("empty reply")]
    EmptyReply,

    #[error("all {attempted} model candidates failed")]
    AllCandidatesExhausted { attempted: usize },
}

impl DispatchError {
    /// Connection, DNS, and timeout failures.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            DispatchError::NetworkFailure { .. } | DispatchError::TimedOut { .. }
        )
    }
}

/// Status of one candidate (endpoint and model) for CLI display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateStatusInfo {
    pub endpoint: String,
    pub model: String,
    pub last_error: Option<String>,
    /// Human-readable time since last success (e.g., "2m ago").
    pub last_success_ago: Option<String>,
    pub last_latency_ms: Option<u64>,
    pub total_calls: u64,
    pub total_failures: u64,
}
