//! Slash commands for the interactive chat.
//!
//! Anything starting with `/` is a command; everything else is a message.

use std::io::{self, Write};

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Start a fresh chat.
    New,
    /// List chats.
    List,
    /// Switch to a chat by id or unique id prefix.
    Switch(String),
    /// Try this model first from now on.
    Model(String),
    /// Show the fallback order with call statistics.
    Models,
    /// Show the endpoint, or set it when a URL is given.
    Endpoint(Option<String>),
    /// Reprint the active chat.
    History,
    /// Unrecognized command or missing argument; carries the message to show.
    Unknown(String),
}

/// Parse a line as a slash command. Returns None for ordinary messages.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (trimmed, None),
    };

    let command = match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/list" | "/chats" => ChatCommand::List,
        "/switch" | "/open" => match arg {
            Some(id) => ChatCommand::Switch(id.to_string()),
            None => ChatCommand::Unknown("/switch requires a chat id".to_string()),
        },
        "/model" => match arg {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Unknown("/model requires a model id (see /models)".to_string()),
        },
        "/models" => ChatCommand::Models,
        "/endpoint" => ChatCommand::Endpoint(arg.map(str::to_string)),
        "/history" => ChatCommand::History,
        other => ChatCommand::Unknown(format!("Unknown command: {other}")),
    };
    Some(command)
}

pub fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    let rows = [
        ("/help", "Show this help message"),
        ("/new", "Start a new chat"),
        ("/list", "List chats"),
        ("/switch <id>", "Switch to another chat (id prefix is fine)"),
        ("/history", "Show the active chat"),
        ("/models", "Show model order and call stats"),
        ("/model <id>", "Try this model first"),
        ("/endpoint [url]", "Show or set the relay endpoint"),
        ("/clear", "Clear the screen"),
        ("/exit", "Leave the chat"),
    ];

    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    for (command, help) in rows {
        writeln!(out, "  {}  {}", style(format!("{command:<16}")).cyan(), help)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Ctrl+D to exit. Chats are saved after every turn.").dim()
    )?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse("hello /world"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/QUIT"), Some(ChatCommand::Exit));
        assert_eq!(parse("  /chats "), Some(ChatCommand::List));
        assert_eq!(parse("/new"), Some(ChatCommand::New));
    }

    #[test]
    fn test_parse_switch_and_model_need_arguments() {
        assert_eq!(
            parse("/switch 0192ab"),
            Some(ChatCommand::Switch("0192ab".to_string()))
        );
        assert!(matches!(parse("/switch"), Some(ChatCommand::Unknown(_))));
        assert_eq!(
            parse("/model   mistral-7b"),
            Some(ChatCommand::Model("mistral-7b".to_string()))
        );
        assert!(matches!(parse("/model  "), Some(ChatCommand::Unknown(_))));
    }

    #[test]
    fn test_parse_endpoint_optional_url() {
        assert_eq!(parse("/endpoint"), Some(ChatCommand::Endpoint(None)));
        assert_eq!(
            parse("/endpoint https://relay.example.dev"),
            Some(ChatCommand::Endpoint(Some(
                "https://relay.example.dev".to_string()
            )))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/frobnicate now"),
            Some(ChatCommand::Unknown("Unknown command: /frobnicate".to_string()))
        );
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut out = Vec::new();
        print_help(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        for cmd in ["/new", "/list", "/switch", "/model", "/models", "/endpoint", "/exit"] {
            assert!(text.contains(cmd), "help is missing {cmd}");
        }
    }
}
