//! Client configuration types for relaychat.
//!
//! `ClientConfig` represents the top-level `config.toml` that controls the
//! relay endpoint, the model fallback ladder, the system prompt, the
//! per-attempt timeout, and the optional local relay server.

use serde::{Deserialize, Serialize};

use crate::llm::ModelCandidate;

/// Relay endpoint used until the user configures their own.
pub const DEFAULT_ENDPOINT: &str = "https://your-worker-name.your-username.workers.dev";

/// System prompt prepended to every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are DevMind AI.";

/// Per-attempt timeout for a single candidate.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Fastest free models, in fallback priority order.
pub const DEFAULT_MODELS: [&str; 3] = [
    "meta-llama/llama-3.1-8b-instruct:free",
    "google/gemma-2-9b-it:free",
    "mistralai/mistral-7b-instruct:free",
];

/// Top-level configuration for the chat client.
///
/// Loaded from `~/.relaychat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay endpoint every model is sent to unless it names its own.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Timeout for a single candidate attempt, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Model ladder in priority order (first = most preferred).
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,

    /// Model to move to the front of the ladder at startup.
    #[serde(default)]
    pub preferred_model: Option<String>,

    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_models() -> Vec<ModelEntry> {
    DEFAULT_MODELS
        .iter()
        .map(|m| ModelEntry::Name(m.to_string()))
        .collect()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            system_prompt: default_system_prompt(),
            timeout_ms: default_timeout_ms(),
            models: default_models(),
            preferred_model: None,
            relay: RelayConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Model identifiers in ladder order.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(ModelEntry::model).collect()
    }

    /// Build the candidate list against `endpoint`.
    ///
    /// Entries with their own endpoint keep it. When `preferred` names a
    /// ladder model, that model moves to the front and the rest keep their
    /// relative order.
    pub fn candidates(&self, endpoint: &str, preferred: Option<&str>) -> Vec<ModelCandidate> {
        let mut candidates: Vec<ModelCandidate> = self
            .models
            .iter()
            .map(|entry| match entry {
                ModelEntry::Name(model) => ModelCandidate::new(endpoint, model.clone()),
                ModelEntry::Routed {
                    model,
                    endpoint: own,
                } => ModelCandidate::new(own.as_deref().unwrap_or(endpoint), model.clone()),
            })
            .collect();

        if let Some(preferred) = preferred {
            if let Some(pos) = candidates.iter().position(|c| c.model == preferred) {
                let chosen = candidates.remove(pos);
                candidates.insert(0, chosen);
            }
        }

        candidates
    }
}

/// One rung of the model ladder: a bare model id or a model routed to its
/// own relay endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Name(String),
    Routed {
        model: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl ModelEntry {
    pub fn model(&self) -> &str {
        match self {
            ModelEntry::Name(model) => model,
            ModelEntry::Routed { model, .. } => model,
        }
    }
}

/// Settings for the bundled relay server (`relaychat relay`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_host")]
    pub host: String,

    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// Chat-completions URL requests are forwarded to.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Environment variable holding the upstream API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sent as `HTTP-Referer` to the upstream.
    #[serde(default)]
    pub referer: Option<String>,

    /// Sent as `X-Title` to the upstream.
    #[serde(default)]
    pub title: Option<String>,

    /// Model used when a request does not name one.
    #[serde(default = "default_relay_model")]
    pub default_model: String,
}

fn default_relay_host() -> String {
    "127.0.0.1".to_string()
}

fn default_relay_port() -> u16 {
    8787
}

fn default_upstream_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_relay_model() -> String {
    DEFAULT_MODELS[0].to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_relay_host(),
            port: default_relay_port(),
            upstream_url: default_upstream_url(),
            api_key_env: default_api_key_env(),
            referer: None,
            title: None,
            default_model: default_relay_model(),
        }
    }
}
