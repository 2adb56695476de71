//! Sequential fallback dispatch across ranked model candidates.
//!
//! Candidates are tried strictly in the order given, one at a time. Each
//! attempt is raced against a timer; when the timer wins, the attempt future
//! is dropped, which aborts its request. The first usable reply wins and no
//! later candidate is contacted.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::Instrument;

use relaychat_types::config::DEFAULT_TIMEOUT_MS;
use relaychat_types::llm::{
    CandidateStatusInfo, DispatchError, DispatchSuccess, ModelCandidate, PromptMessage,
    RelayRequest,
};

use super::box_transport::BoxRelayTransport;
use super::stats::CandidateStats;

/// Stats key: the same model routed through two relays is two candidates.
type CandidateKey = (String, String);

fn key_of(candidate: &ModelCandidate) -> CandidateKey {
    (candidate.endpoint.clone(), candidate.model.clone())
}

/// Walks a candidate list until one model answers.
#[derive(Debug)]
pub struct DispatchEngine {
    transport: BoxRelayTransport,
    timeout: Duration,
    stats: HashMap<CandidateKey, CandidateStats>,
}

impl DispatchEngine {
    pub fn new(transport: BoxRelayTransport, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            stats: HashMap::new(),
        }
    }

    /// Engine with the default 15s per-attempt timeout.
    pub fn with_default_timeout(transport: BoxRelayTransport) -> Self {
        Self::new(transport, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `messages` to each candidate in turn until one replies.
    ///
    /// Intermediate failures are logged and recorded, never returned. Only
    /// [`DispatchError::AllCandidatesExhausted`] leaves this function,
    /// including for an empty candidate list.
    #[tracing::instrument(
        skip(self, candidates, messages),
        fields(candidates = candidates.len(), transport = self.transport.name())
    )]
    pub async fn resolve(
        &mut self,
        candidates: &[ModelCandidate],
        messages: &[PromptMessage],
    ) -> Result<DispatchSuccess, DispatchError> {
        for (index, candidate) in candidates.iter().enumerate() {
            let request = RelayRequest {
                model: candidate.model.clone(),
                messages: messages.to_vec(),
            };

            let span = tracing::info_span!(
                "gen_ai.chat",
                gen_ai.operation.name = "chat",
                gen_ai.request.model = %candidate.model,
                attempt = index + 1,
            );
            let start = Instant::now();
            let outcome = self
                .attempt(&candidate.endpoint, &request)
                .instrument(span)
                .await;
            let latency = start.elapsed();

            let stats = self
                .stats
                .entry(key_of(candidate))
                .or_insert_with(|| CandidateStats::new(&candidate.endpoint, &candidate.model));

            match outcome {
                Ok(content) => {
                    stats.record_success(latency);
                    tracing::info!(
                        model = %candidate.model,
                        latency_ms = latency.as_millis() as u64,
                        attempt = index + 1,
                        "Candidate answered"
                    );
                    return Ok(DispatchSuccess {
                        content,
                        model_used: candidate.model.clone(),
                        endpoint: candidate.endpoint.clone(),
                        attempts: index + 1,
                    });
                }
                Err(err) => {
                    stats.record_failure(&err, latency);
                    tracing::warn!(
                        model = %candidate.model,
                        latency_ms = latency.as_millis() as u64,
                        error = %err,
                        "Candidate failed, trying next"
                    );
                }
            }
        }

        tracing::error!(attempted = candidates.len(), "All model candidates failed");
        Err(DispatchError::AllCandidatesExhausted {
            attempted: candidates.len(),
        })
    }

    /// One bounded attempt against one candidate, yielding usable content.
    async fn attempt(
        &self,
        endpoint: &str,
        request: &RelayRequest,
    ) -> Result<String, DispatchError> {
        let post = self.transport.post(endpoint, request);
        let response = match tokio::time::timeout(self.timeout, post).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Err(DispatchError::TimedOut {
                    after_ms: self.timeout.as_millis() as u64,
                });
            }
        };

        response
            .first_content()
            .map(str::to_string)
            .ok_or(DispatchError::EmptyReply)
    }

    /// Stats for every candidate attempted so far: `order` first, then the
    /// rest by model and endpoint.
    pub fn status(&self, order: &[ModelCandidate]) -> Vec<CandidateStatusInfo> {
        let mut infos: Vec<CandidateStatusInfo> = order
            .iter()
            .map(|c| {
                self.stats
                    .get(&key_of(c))
                    .map(CandidateStats::to_status_info)
                    .unwrap_or_else(|| CandidateStats::new(&c.endpoint, &c.model).to_status_info())
            })
            .collect();

        let mut rest: Vec<&CandidateStats> = self
            .stats
            .values()
            .filter(|s| {
                !order
                    .iter()
                    .any(|c| c.model == s.model && c.endpoint == s.endpoint)
            })
            .collect();
        rest.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.endpoint.cmp(&b.endpoint)));
        infos.extend(rest.into_iter().map(CandidateStats::to_status_info));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{MockReply, MockTransport, called_models};

    fn candidates(models: &[&str]) -> Vec<ModelCandidate> {
        models
            .iter()
            .map(|m| ModelCandidate::new("https://relay.test", *m))
            .collect()
    }

    fn prompt() -> Vec<PromptMessage> {
        vec![
            PromptMessage::system("You are DevMind AI."),
            PromptMessage::user("hello"),
        ]
    }

    fn engine(mock: MockTransport) -> DispatchEngine {
        DispatchEngine::new(BoxRelayTransport::new(mock), Duration::from_millis(15_000))
    }

    #[tokio::test]
    async fn test_first_candidate_success() {
        let mock = MockTransport::new().reply("a", MockReply::Content("hi".into()));
        let calls = mock.calls();
        let mut engine = engine(mock);

        let success = engine
            .resolve(&candidates(&["a", "b"]), &prompt())
            .await
            .unwrap();

        assert_eq!(success.content, "hi");
        assert_eq!(success.model_used, "a");
        assert_eq!(success.attempts, 1);
        assert_eq!(called_models(&calls), vec!["a"]);
    }

    #[tokio::test]
    async fn test_success_at_k_stops_later_candidates() {
        let mock = MockTransport::new()
            .reply(
                "a",
                MockReply::Fail(DispatchError::NetworkFailure {
                    message: "refused".into(),
                }),
            )
            .reply("b", MockReply::Content("from b".into()))
            .reply("c", MockReply::Content("from c".into()));
        let calls = mock.calls();
        let mut engine = engine(mock);

        let success = engine
            .resolve(&candidates(&["a", "b", "c"]), &prompt())
            .await
            .unwrap();

        assert_eq!(success.model_used, "b");
        assert_eq!(success.attempts, 2);
        assert_eq!(called_models(&calls), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_request_carries_model_and_messages() {
        let mock = MockTransport::new().reply("a", MockReply::Content("hi".into()));
        let calls = mock.calls();
        let mut engine = engine(mock);

        engine.resolve(&candidates(&["a"]), &prompt()).await.unwrap();

        let sent = calls.lock().unwrap()[0].clone();
        assert_eq!(sent.model, "a");
        assert_eq!(sent.messages, prompt());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_to_next_candidate() {
        let mock = MockTransport::new()
            .reply("slow", MockReply::Hang)
            .reply("fast", MockReply::Content("hi".into()));
        let calls = mock.calls();
        let mut engine = engine(mock);

        let success = engine
            .resolve(&candidates(&["slow", "fast"]), &prompt())
            .await
            .unwrap();

        assert_eq!(success.content, "hi");
        assert_eq!(called_models(&calls), vec!["slow", "fast"]);

        let status = engine.status(&candidates(&["slow", "fast"]));
        assert_eq!(status[0].total_failures, 1);
        assert_eq!(status[0].last_error.as_deref(), Some("timed out after 15000ms"));
        assert_eq!(status[1].total_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_within_timeout_is_accepted() {
        let mock = MockTransport::new().reply(
            "a",
            MockReply::Delayed(Duration::from_millis(14_000), "late but fine".into()),
        );
        let mut engine = engine(mock);

        let success = engine.resolve(&candidates(&["a"]), &prompt()).await.unwrap();
        assert_eq!(success.content, "late but fine");
    }

    #[tokio::test]
    async fn test_empty_reply_is_failure() {
        let mock = MockTransport::new()
            .reply("a", MockReply::Content("   ".into()))
            .reply("b", MockReply::Content("real answer".into()));
        let mut engine = engine(mock);

        let success = engine
            .resolve(&candidates(&["a", "b"]), &prompt())
            .await
            .unwrap();
        assert_eq!(success.model_used, "b");

        let status = engine.status(&candidates(&["a", "b"]));
        assert_eq!(status[0].last_error.as_deref(), Some("empty reply"));
    }

    #[tokio::test]
    async fn test_all_failing_is_exhausted() {
        let mock = MockTransport::new()
            .reply(
                "a",
                MockReply::Fail(DispatchError::ProviderFailure {
                    status: Some(429),
                    message: "busy".into(),
                }),
            )
            .reply("b", MockReply::Fail(DispatchError::EmptyReply));
        let calls = mock.calls();
        let mut engine = engine(mock);

        let err = engine
            .resolve(&candidates(&["a", "b"]), &prompt())
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::AllCandidatesExhausted { attempted: 2 });
        assert_eq!(called_models(&calls), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_exhausted() {
        let mock = MockTransport::new();
        let calls = mock.calls();
        let mut engine = engine(mock);

        let err = engine.resolve(&[], &prompt()).await.unwrap_err();

        assert_eq!(err, DispatchError::AllCandidatesExhausted { attempted: 0 });
        assert!(called_models(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_stats_never_reorder_candidates() {
        let mock = MockTransport::new().reply("b", MockReply::Content("ok".into()));
        let calls = mock.calls();
        let mut engine = engine(mock);
        let order = candidates(&["a", "b"]);

        engine.resolve(&order, &prompt()).await.unwrap();
        engine.resolve(&order, &prompt()).await.unwrap();

        // "a" failed both times and is still tried first.
        assert_eq!(called_models(&calls), vec!["a", "b", "a", "b"]);
    }

    #[tokio::test]
    async fn test_status_lists_untried_and_dropped_models() {
        let mock = MockTransport::new().reply("old", MockReply::Content("ok".into()));
        let mut engine = engine(mock);
        engine.resolve(&candidates(&["old"]), &prompt()).await.unwrap();

        let status = engine.status(&candidates(&["new"]));
        let models: Vec<&str> = status.iter().map(|s| s.model.as_str()).collect();
        assert_eq!(models, vec!["new", "old"]);
        assert_eq!(status[0].total_calls, 0);
        assert_eq!(status[1].total_calls, 1);
    }

    #[tokio::test]
    async fn test_same_model_on_two_endpoints_has_separate_stats() {
        let mock = MockTransport::new().reply("m", MockReply::Content("ok".into()));
        let mut engine = engine(mock);
        let order = vec![
            ModelCandidate::new("https://east.test", "m"),
            ModelCandidate::new("https://west.test", "m"),
        ];

        engine.resolve(&order, &prompt()).await.unwrap();

        let status = engine.status(&order);
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].endpoint, "https://east.test");
        assert_eq!(status[0].total_calls, 1);
        assert_eq!(status[1].endpoint, "https://west.test");
        assert_eq!(status[1].total_calls, 0);
    }
}
