//! UpstreamClient -- forwards relay requests to the chat-completions API.
//!
//! The relay server owns the provider key so that chat clients never see it.
//! The key is held as a [`SecretString`] and only exposed while building the
//! `Authorization` header.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use relaychat_types::config::RelayConfig;

/// Errors while forwarding to the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("{0}")]
    Request(String),

    #[error("upstream returned invalid JSON: {0}")]
    InvalidJson(String),
}

/// Client for the upstream chat-completions endpoint.
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
    api_key: SecretString,
    referer: Option<String>,
    title: Option<String>,
    default_model: String,
}

impl UpstreamClient {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        api_key: SecretString,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            referer: None,
            title: None,
            default_model: default_model.into(),
        }
    }

    /// Build from `[relay]` settings, reading the key from `api_key_env`.
    pub fn from_config(config: &RelayConfig) -> Result<Self, UpstreamError> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| UpstreamError::MissingApiKey(config.api_key_env.clone()))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("relaychat-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        Ok(Self::new(
            client,
            config.upstream_url.clone(),
            SecretString::from(key),
            config.default_model.clone(),
        )
        .with_attribution(config.referer.clone(), config.title.clone()))
    }

    /// Set the `HTTP-Referer` and `X-Title` headers sent upstream.
    pub fn with_attribution(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Upstream body for a client request: its model (or the default), its
    /// messages, and `stream: false`.
    pub fn build_body(&self, request: &Value) -> Value {
        let model = request
            .get("model")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);
        let mut body = json!({ "model": model, "stream": false });
        if let Some(messages) = request.get("messages") {
            body["messages"] = messages.clone();
        }
        body
    }

    /// Forward `request` and return the upstream JSON untouched, whatever
    /// its HTTP status.
    #[tracing::instrument(skip(self, request), fields(url = %self.url))]
    pub async fn forward(&self, request: &Value) -> Result<Value, UpstreamError> {
        let body = self.build_body(request);

        let mut builder = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json");
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), model = %body["model"], "Upstream returned an error status");
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::InvalidJson(e.without_url().to_string()))
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn client(url: String) -> UpstreamClient {
        UpstreamClient::new(
            reqwest::Client::new(),
            url,
            SecretString::from("sk-test".to_string()),
            "meta-llama/llama-3.1-8b-instruct:free",
        )
    }

    #[test]
    fn test_build_body_defaults_model_and_disables_stream() {
        let upstream = client("http://unused".into());

        let body = upstream.build_body(&json!({"messages": [{"role": "user", "content": "hi"}]}));
        assert_eq!(body["model"], "meta-llama/llama-3.1-8b-instruct:free");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["content"], "hi");

        let body = upstream.build_body(&json!({"model": "google/gemma-2-9b-it:free", "stream": true}));
        assert_eq!(body["model"], "google/gemma-2-9b-it:free");
        assert_eq!(body["stream"], false);
        assert!(body.get("messages").is_none());
    }

    #[tokio::test]
    async fn test_forward_sends_auth_and_attribution_headers() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                };
                Json(json!({
                    "auth": header("authorization"),
                    "referer": header("http-referer"),
                    "title": header("x-title"),
                    "model": body["model"],
                }))
            }),
        );
        let url = serve(router).await;
        let upstream = client(url).with_attribution(
            Some("https://chat.example.dev".into()),
            Some("DevMind".into()),
        );

        let echoed = upstream.forward(&json!({"messages": []})).await.unwrap();

        assert_eq!(echoed["auth"], "Bearer sk-test");
        assert_eq!(echoed["referer"], "https://chat.example.dev");
        assert_eq!(echoed["title"], "DevMind");
        assert_eq!(echoed["model"], "meta-llama/llama-3.1-8b-instruct:free");
    }

    #[tokio::test]
    async fn test_forward_passes_error_json_through() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "rate limited"}})),
                )
            }),
        );
        let url = serve(router).await;

        let value = client(url).forward(&json!({})).await.unwrap();
        assert_eq!(value["error"]["message"], "rate limited");
    }

    #[tokio::test]
    async fn test_forward_non_json_is_error() {
        let router = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
        let url = serve(router).await;

        let err = client(url).forward(&json!({})).await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidJson(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let upstream = client("http://unused".into());
        let debug = format!("{upstream:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = RelayConfig {
            api_key_env: "RELAYCHAT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..RelayConfig::default()
        };
        let err = UpstreamClient::from_config(&config).unwrap_err();
        assert!(matches!(err, UpstreamError::MissingApiKey(_)));
    }
}
