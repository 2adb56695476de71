//! Model fallback order display.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use relaychat_types::llm::{CandidateStatusInfo, ModelCandidate};

use crate::state::AppState;

const ERROR_DISPLAY_CHARS: usize = 40;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fallback order without statistics.
pub fn order_table(candidates: &[ModelCandidate]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Endpoint").fg(Color::White),
    ]);
    for (i, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).fg(Color::Cyan),
            Cell::new(&candidate.model).fg(Color::White),
            Cell::new(&candidate.endpoint).fg(Color::DarkGrey),
        ]);
    }
    table
}

/// Fallback order joined with this session's call statistics.
///
/// Candidates tracked in `status` that are no longer in the order are
/// listed after the others without a position.
pub fn models_table(candidates: &[ModelCandidate], status: &[CandidateStatusInfo]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Endpoint").fg(Color::White),
        Cell::new("Last Success").fg(Color::White),
        Cell::new("Latency").fg(Color::White),
        Cell::new("Calls").fg(Color::White),
        Cell::new("Failures").fg(Color::White),
        Cell::new("Last Error").fg(Color::White),
    ]);

    for info in status {
        let position = candidates
            .iter()
            .position(|c| c.model == info.model && c.endpoint == info.endpoint);

        let failures_cell = if info.total_failures > 0 {
            Cell::new(info.total_failures).fg(Color::Yellow)
        } else {
            Cell::new(info.total_failures).fg(Color::White)
        };

        table.add_row(vec![
            Cell::new(position.map(|i| (i + 1).to_string()).unwrap_or_default()).fg(Color::Cyan),
            Cell::new(&info.model).fg(Color::White),
            Cell::new(&info.endpoint).fg(Color::DarkGrey),
            Cell::new(info.last_success_ago.as_deref().unwrap_or("never")).fg(Color::Green),
            Cell::new(
                info.last_latency_ms
                    .map(|ms| format!("{ms}ms"))
                    .unwrap_or_else(|| "-".to_string()),
            )
            .fg(Color::DarkGrey),
            Cell::new(info.total_calls).fg(Color::White),
            failures_cell,
            Cell::new(truncate_error(info.last_error.as_deref())).fg(Color::DarkGrey),
        ]);
    }

    table
}

fn truncate_error(error: Option<&str>) -> String {
    let Some(error) = error else {
        return "-".to_string();
    };
    match error.char_indices().nth(ERROR_DISPLAY_CHARS - 3) {
        Some((cut, _)) if error.chars().count() > ERROR_DISPLAY_CHARS => {
            format!("{}...", &error[..cut])
        }
        _ => error.to_string(),
    }
}

/// Show the model order the next turn would use.
pub async fn list_models(state: &AppState, json: bool) -> Result<()> {
    let controller = state.controller().await?;
    let candidates = controller.candidates();

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Model Fallback Order").bold());
    println!();
    println!("{}", order_table(&candidates));
    println!();
    println!(
        "  {} model{} in order",
        style(candidates.len()).bold(),
        if candidates.len() == 1 { "" } else { "s" }
    );
    println!(
        "  {}",
        style("Set preferred_model in config.toml or use /model in chat to reorder.").dim()
    );
    println!(
        "  {}",
        style("Call statistics are kept per chat session; see /models in chat.").dim()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(endpoint: &str, model: &str) -> CandidateStatusInfo {
        CandidateStatusInfo {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            last_error: None,
            last_success_ago: None,
            last_latency_ms: None,
            total_calls: 0,
            total_failures: 0,
        }
    }

    #[test]
    fn table_numbers_candidates_in_order() {
        let candidates = vec![
            ModelCandidate::new("https://a.dev", "m1"),
            ModelCandidate::new("https://b.dev", "m2"),
        ];
        let mut stale = info("https://a.dev", "old-model");
        stale.total_calls = 3;
        let status = vec![info("https://a.dev", "m1"), info("https://b.dev", "m2"), stale];

        let rendered = models_table(&candidates, &status).to_string();
        let m1 = rendered.find("m1").unwrap();
        let m2 = rendered.find("m2").unwrap();
        assert!(m1 < m2);
        assert!(rendered.contains("https://b.dev"));
        assert!(rendered.contains("old-model"));
    }

    #[test]
    fn same_model_on_two_endpoints_gets_two_rows() {
        let candidates = vec![
            ModelCandidate::new("https://a.dev", "shared"),
            ModelCandidate::new("https://b.dev", "shared"),
        ];
        let mut on_b = info("https://b.dev", "shared");
        on_b.total_failures = 7;
        let status = vec![info("https://a.dev", "shared"), on_b];

        let rendered = models_table(&candidates, &status).to_string();
        assert_eq!(rendered.matches("shared").count(), 2);
        let a = rendered.find("https://a.dev").unwrap();
        let b = rendered.find("https://b.dev").unwrap();
        assert!(a < b);
        assert!(rendered.contains('7'));
    }

    #[test]
    fn order_table_has_no_statistics_columns() {
        let candidates = vec![
            ModelCandidate::new("https://a.dev", "m1"),
            ModelCandidate::new("https://b.dev", "m2"),
        ];
        let rendered = order_table(&candidates).to_string();
        assert!(rendered.contains("m1"));
        assert!(rendered.contains("https://b.dev"));
        assert!(!rendered.contains("Last Success"));
        assert!(!rendered.contains("Calls"));
        assert!(!rendered.contains("never"));
    }

    #[test]
    fn long_errors_are_truncated_on_char_boundary() {
        let long = "é".repeat(60);
        let shown = truncate_error(Some(&long));
        assert_eq!(shown.chars().count(), ERROR_DISPLAY_CHARS);
        assert!(shown.ends_with("..."));
        assert_eq!(truncate_error(Some("HTTP 429")), "HTTP 429");
        assert_eq!(truncate_error(None), "-");
    }
}
