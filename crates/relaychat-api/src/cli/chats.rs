//! Chat management commands: new, list, switch, show.

use std::io::{self, Write};

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use relaychat_types::chat::{Chat, ChatId, ChatSummary, MessageRole};

use crate::state::AppState;

/// Resolve a user-typed chat reference: an exact id or a unique id prefix.
pub fn resolve_chat_id(chats: &[ChatSummary], input: &str) -> Result<ChatId> {
    let input = input.trim();
    if input.is_empty() {
        bail!("chat id must not be empty");
    }

    if let Some(exact) = chats.iter().find(|c| c.id.as_str() == input) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<&ChatSummary> = chats
        .iter()
        .filter(|c| c.id.as_str().starts_with(input))
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => bail!("no chat matches '{input}'"),
        many => bail!(
            "'{input}' is ambiguous ({} chats match); use more characters",
            many.len()
        ),
    }
}

/// Create an empty chat and make it active.
pub async fn new_chat(state: &AppState, json: bool) -> Result<()> {
    let mut controller = state.controller().await?;
    let chat_id = controller.create_chat().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "id": chat_id }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Created chat {}",
        style("✓").green().bold(),
        style(chat_id.short()).cyan()
    );
    println!();
    Ok(())
}

/// List all chats, newest first.
pub async fn list_chats(state: &AppState, json: bool) -> Result<()> {
    let controller = state.controller().await?;
    let session = controller.session();
    let chats = session.list();
    let active = session.active_id();

    if json {
        let rows: Vec<serde_json::Value> = chats
            .iter()
            .map(|chat| {
                serde_json::json!({
                    "id": chat.id,
                    "title": chat.title,
                    "messages": chat.messages.len(),
                    "created_at": chat.created_at,
                    "active": Some(&chat.id) == active,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        println!(
            "  {} No chats yet. Start one with: {}",
            style("i").blue().bold(),
            style("relaychat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for chat in &chats {
        let marker = if Some(&chat.id) == active {
            Cell::new("●").fg(Color::Green)
        } else {
            Cell::new("")
        };

        table.add_row(vec![
            marker,
            Cell::new(chat.id.as_str()).fg(Color::Cyan),
            Cell::new(&chat.title),
            Cell::new(chat.messages.len()),
            Cell::new(format_relative_time(&chat.created_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} chat{}",
        style(chats.len()).bold(),
        if chats.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Make another chat active.
pub async fn switch_chat(state: &AppState, input: &str, json: bool) -> Result<()> {
    let mut controller = state.controller().await?;
    let chat_id = resolve_chat_id(&controller.chats(), input)?;
    controller.switch_chat(&chat_id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "active_id": chat_id }))?
        );
        return Ok(());
    }

    let title = controller
        .active_chat()
        .map(|chat| chat.title.clone())
        .unwrap_or_default();
    println!();
    println!(
        "  {} Switched to {} {}",
        style("✓").green().bold(),
        style(chat_id.short()).cyan(),
        style(title).bold()
    );
    println!();
    Ok(())
}

/// Print a chat's messages (the active chat when no id is given).
pub async fn show_chat(state: &AppState, input: Option<&str>, json: bool) -> Result<()> {
    let controller = state.controller().await?;
    let chat = match input {
        Some(input) => {
            let chat_id = resolve_chat_id(&controller.chats(), input)?;
            controller.session().get(&chat_id)
        }
        None => controller.active_chat(),
    };

    let Some(chat) = chat else {
        bail!("no active chat; create one with `relaychat new`");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(chat)?);
        return Ok(());
    }

    write_chat(&mut std::io::stdout(), chat)?;
    Ok(())
}

/// Print a chat header followed by its messages.
pub fn write_chat<W: Write>(out: &mut W, chat: &Chat) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}  {}",
        style("Chat").dim(),
        style(&chat.title).bold(),
        style(chat.id.short()).dim()
    )?;
    writeln!(out)?;

    if chat.messages.is_empty() {
        writeln!(out, "  {}", style("(no messages)").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    for message in &chat.messages {
        let time = message.timestamp.format("%H:%M");
        match message.role {
            MessageRole::User => writeln!(
                out,
                "  {} {}",
                style(format!("[{time}] You:")).cyan().bold(),
                message.content
            )?,
            MessageRole::Assistant => {
                let model = message.model.as_deref().unwrap_or("assistant");
                writeln!(
                    out,
                    "  {} {}",
                    style(format!("[{time}] {model}:")).green().bold(),
                    message.content
                )?;
            }
            MessageRole::Error => writeln!(
                out,
                "  {} {}",
                style(format!("[{time}]")).dim(),
                style(&message.content).red()
            )?,
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Compact chat list for the interactive `/list` command.
pub fn write_chat_list<W: Write>(
    out: &mut W,
    chats: &[ChatSummary],
    active: Option<&ChatId>,
) -> io::Result<()> {
    writeln!(out)?;
    if chats.is_empty() {
        writeln!(out, "  {}", style("No chats yet.").dim())?;
        writeln!(out)?;
        return Ok(());
    }
    for chat in chats {
        let marker = if Some(&chat.id) == active { "●" } else { " " };
        writeln!(
            out,
            "  {} {}  {}",
            style(marker).green(),
            style(chat.id.short()).cyan(),
            chat.title
        )?;
    }
    writeln!(out)?;
    Ok(())
}

pub(crate) fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
