//! Per-candidate call statistics for the dispatch engine.
//!
//! Purely observational: the engine never skips or reorders a candidate
//! because of what is recorded here. The numbers feed the `/models` chat command.

use std::time::{Duration, Instant};

use relaychat_types::llm::{CandidateStatusInfo, DispatchError};

/// Call history of one model on one endpoint.
#[derive(Debug, Clone)]
pub struct CandidateStats {
    pub endpoint: String,
    pub model: String,
    pub last_error: Option<String>,
    pub last_success: Option<Instant>,
    pub last_latency_ms: Option<u64>,
    pub total_calls: u64,
    pub total_failures: u64,
}

impl CandidateStats {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            last_error: None,
            last_success: None,
            last_latency_ms: None,
            total_calls: 0,
            total_failures: 0,
        }
    }

    pub fn record_success(&mut self, latency: Duration) {
        self.total_calls += 1;
        self.last_success = Some(Instant::now());
        self.last_latency_ms = Some(latency.as_millis() as u64);
    }

    pub fn record_failure(&mut self, error: &DispatchError, latency: Duration) {
        self.total_calls += 1;
        self.total_failures += 1;
        self.last_error = Some(error.to_string());
        self.last_latency_ms = Some(latency.as_millis() as u64);
    }

    /// Convert to a `CandidateStatusInfo` for CLI display.
    pub fn to_status_info(&self) -> CandidateStatusInfo {
        CandidateStatusInfo {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            last_error: self.last_error.clone(),
            last_success_ago: self.last_success.map(|s| format_ago(s.elapsed())),
            last_latency_ms: self.last_latency_ms,
            total_calls: self.total_calls,
            total_failures: self.total_failures,
        }
    }
}

fn format_ago(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
