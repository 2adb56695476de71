//! CLI command definitions for the `relaychat` binary.
//!
//! Uses clap derive macros for argument parsing. Bare `relaychat` starts the
//! interactive chat; the other subcommands work on saved chats one shot.

pub mod chat;
pub mod chats;
pub mod endpoint;
pub mod models;
pub mod send;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with free language models through your own relay.
#[derive(Parser)]
#[command(name = "relaychat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Keep chats in memory only; nothing is saved.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "RELAYCHAT_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (the default).
    Chat {
        /// Open this chat (id or unique id prefix) instead of the last active one.
        #[arg(long)]
        chat: Option<String>,

        /// Start in a fresh chat.
        #[arg(long, conflicts_with = "chat")]
        new: bool,
    },

    /// Send one message to the active chat and print the reply.
    Send {
        /// Message text (words are joined with spaces).
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Create an empty chat and make it active.
    New,

    /// List chats, newest first.
    #[command(alias = "ls")]
    List,

    /// Make another chat active.
    Switch {
        /// Chat id or unique id prefix.
        id: String,
    },

    /// Print a chat's messages.
    Show {
        /// Chat id or unique id prefix (defaults to the active chat).
        id: Option<String>,
    },

    /// Show or set the relay endpoint.
    Endpoint {
        /// New endpoint URL (http:// or https://).
        url: Option<String>,
    },

    /// Show the model fallback order.
    Models,

    /// Run the relay server that forwards to the chat-completions API.
    Relay {
        /// Port to listen on (default from config, 8787).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config, 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["relaychat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn send_joins_words() {
        let cli = Cli::try_parse_from(["relaychat", "--json", "send", "hello", "there"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Send { text }) => assert_eq!(text.join(" "), "hello there"),
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn chat_and_new_conflict() {
        assert!(Cli::try_parse_from(["relaychat", "chat", "--new", "--chat", "abc"]).is_err());
    }
}
