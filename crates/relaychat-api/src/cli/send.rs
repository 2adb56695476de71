//! One-shot `relaychat send`: one turn on the active chat.

use anyhow::{Result, bail};
use console::style;

use relaychat_core::chat::controller::{TurnOutcome, TurnReport};
use relaychat_types::chat::MessageRole;

use super::chat::presenter::TerminalPresenter;
use super::chat::renderer::ChatRenderer;
use crate::state::AppState;

/// Send `text` to the active chat (creating one if needed) and print the reply.
pub async fn send_message(state: &AppState, text: &str, json: bool) -> Result<()> {
    let mut controller = state.controller().await?;

    if json {
        let outcome = controller.send_turn(text).await?;
        let TurnOutcome::Completed(report) = outcome else {
            bail!("message is empty");
        };
        let value = serde_json::json!({
            "chat_id": report.chat_id,
            "ok": report.message.role == MessageRole::Assistant,
            "message": report.message,
            "model_used": report.model_used,
            "persistence_error": report.persistence_error,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return ensure_answered(&report);
    }

    let styled = console::Term::stdout().is_term();
    let presenter = TerminalPresenter::new(
        std::io::stdout(),
        ChatRenderer::new(styled),
        console::Term::stderr().is_term(),
    );
    let drawing = tokio::spawn(presenter.run(controller.subscribe()));

    let outcome = controller.send_turn(text).await;
    // Closing the bus lets the presenter drain and stop.
    drop(controller);
    if let Err(e) = drawing.await {
        tracing::warn!(error = %e, "Presenter task failed");
    }

    let TurnOutcome::Completed(report) = outcome? else {
        bail!("message is empty");
    };

    if let Some(err) = &report.persistence_error {
        eprintln!(
            "  {} Reply not saved: {err}",
            style("!").yellow().bold()
        );
    }
    ensure_answered(&report)
}

/// Fails the command when the turn ended in an error message, so the exit
/// status is the same with and without `--json`.
fn ensure_answered(report: &TurnReport) -> Result<()> {
    if report.message.role != MessageRole::Assistant {
        bail!("no model answered");
    }
    Ok(())
}
