//! Interactive chat loop.
//!
//! Reads lines, runs slash commands against the controller, and sends
//! everything else as a turn. Replies are drawn by the presenter task, so
//! this loop only prints command output and warnings.

use std::io::Write;

use anyhow::Context;
use console::style;
use rustyline_async::SharedWriter;

use relaychat_core::chat::controller::TurnOutcome;

use crate::cli::chats::{resolve_chat_id, write_chat, write_chat_list};
use crate::cli::models::models_table;
use crate::state::{AppController, AppState};

use super::banner::{BannerInfo, print_welcome_banner};
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::presenter::TerminalPresenter;
use super::renderer::ChatRenderer;

const PROMPT: &str = "you › ";

enum Flow {
    Continue,
    Exit,
}

/// Run the interactive chat until `/exit` or Ctrl+D.
pub async fn run_chat_loop(
    state: &AppState,
    open_chat: Option<&str>,
    start_new: bool,
) -> anyhow::Result<()> {
    let mut controller = state.controller().await?;

    if let Some(reference) = open_chat {
        let chat_id = resolve_chat_id(&controller.chats(), reference)?;
        controller.switch_chat(&chat_id).await?;
    } else if start_new {
        controller.create_chat().await?;
    }

    let (mut input, mut out) =
        ChatInput::new(PROMPT.to_string()).context("failed to start line editor")?;

    let first_model = controller
        .candidates()
        .first()
        .map(|c| c.model.clone())
        .unwrap_or_else(|| "(none configured)".to_string());
    print_welcome_banner(
        &mut out,
        &BannerInfo {
            endpoint: controller.endpoint(),
            model: &first_model,
            chat_title: controller.active_chat().map(|chat| chat.title.as_str()),
            ephemeral: state.ephemeral,
        },
    )?;
    if let Some(chat) = controller.active_chat().filter(|chat| !chat.messages.is_empty()) {
        write_chat(&mut out, chat)?;
    }

    let presenter = TerminalPresenter::new(out.clone(), ChatRenderer::new(true), true);
    let drawing = tokio::spawn(presenter.run(controller.subscribe()));

    loop {
        let line = match input.read_line().await {
            InputEvent::Line(line) => line,
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                writeln!(out, "  {}", style("Use /exit or Ctrl+D to leave.").dim())?;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        if let Some(command) = commands::parse(&line) {
            match handle_command(command, &mut controller, &mut input, &mut out).await {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(out, "  {} {e:#}", style("!").red().bold())?,
            }
            continue;
        }

        match controller.send_turn(&line).await {
            Ok(TurnOutcome::Completed(report)) => {
                if let Some(err) = report.persistence_error {
                    writeln!(
                        out,
                        "  {} Chat not saved: {err}",
                        style("!").yellow().bold()
                    )?;
                }
            }
            Ok(TurnOutcome::Ignored) => {}
            Err(e) => writeln!(out, "  {} {e}", style("!").red().bold())?,
        }
    }

    let flushed = controller.flush().await;
    drop(controller);
    if let Err(e) = drawing.await {
        tracing::warn!(error = %e, "Presenter task failed");
    }

    writeln!(out, "\n  {}", style("Goodbye!").dim())?;
    input.finish();

    flushed.context("failed to save chats on exit")?;
    Ok(())
}

async fn handle_command(
    command: ChatCommand,
    controller: &mut AppController,
    input: &mut ChatInput,
    out: &mut SharedWriter,
) -> anyhow::Result<Flow> {
    match command {
        ChatCommand::Exit => return Ok(Flow::Exit),
        ChatCommand::Help => commands::print_help(out)?,
        ChatCommand::Clear => input.clear(),
        ChatCommand::New => {
            let chat_id = controller.create_chat().await?;
            writeln!(
                out,
                "  {} New chat {}",
                style("✓").green().bold(),
                style(chat_id.short()).cyan()
            )?;
        }
        ChatCommand::List => {
            let active = controller.session().active_id().cloned();
            write_chat_list(out, &controller.chats(), active.as_ref())?;
        }
        ChatCommand::Switch(reference) => {
            let chat_id = resolve_chat_id(&controller.chats(), &reference)?;
            controller.switch_chat(&chat_id).await?;
            if let Some(chat) = controller.active_chat() {
                write_chat(out, chat)?;
            }
        }
        ChatCommand::History => match controller.active_chat() {
            Some(chat) => write_chat(out, chat)?,
            None => writeln!(out, "  {}", style("No active chat yet.").dim())?,
        },
        ChatCommand::Model(model) => {
            controller.select_model(&model)?;
            writeln!(
                out,
                "  {} {} will be tried first",
                style("✓").green().bold(),
                style(&model).cyan()
            )?;
        }
        ChatCommand::Models => {
            writeln!(out)?;
            writeln!(out, "{}", models_table(&controller.candidates(), &controller.status()))?;
            writeln!(out)?;
        }
        ChatCommand::Endpoint(None) => {
            writeln!(
                out,
                "  {}  {}",
                style("Endpoint:").bold(),
                style(controller.endpoint()).cyan()
            )?;
        }
        ChatCommand::Endpoint(Some(url)) => {
            controller.update_endpoint(&url).await?;
            writeln!(
                out,
                "  {} Endpoint set to {}",
                style("✓").green().bold(),
                style(controller.endpoint()).cyan()
            )?;
        }
        ChatCommand::Unknown(message) => {
            writeln!(
                out,
                "  {} {message}. Type {} for commands.",
                style("?").yellow().bold(),
                style("/help").cyan()
            )?;
        }
    }
    Ok(Flow::Continue)
}
