//! relaychat CLI and relay server entry point.
//!
//! Binary name: `relaychat`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, then
//! dispatches to the command handler or starts the relay server.

mod cli;
mod http;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use relaychat_infra::relay::upstream::UpstreamClient;
use relaychat_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,relaychat=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("failed to init tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Chat {
        chat: None,
        new: false,
    });

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "relaychat", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.ephemeral).await?;

    match command {
        Commands::Chat { chat, new } => {
            cli::chat::loop_runner::run_chat_loop(&state, chat.as_deref(), new).await?;
        }
        Commands::Send { text } => {
            cli::send::send_message(&state, &text.join(" "), cli.json).await?;
        }
        Commands::New => cli::chats::new_chat(&state, cli.json).await?,
        Commands::List => cli::chats::list_chats(&state, cli.json).await?,
        Commands::Switch { id } => cli::chats::switch_chat(&state, &id, cli.json).await?,
        Commands::Show { id } => cli::chats::show_chat(&state, id.as_deref(), cli.json).await?,
        Commands::Endpoint { url } => {
            cli::endpoint::endpoint(&state, url.as_deref(), cli.json).await?;
        }
        Commands::Models => cli::models::list_models(&state, cli.json).await?,
        Commands::Relay { port, host } => {
            let mut relay = state.config.relay.clone();
            if let Some(port) = port {
                relay.port = port;
            }
            if let Some(host) = host {
                relay.host = host;
            }

            let upstream = UpstreamClient::from_config(&relay).with_context(|| {
                format!(
                    "cannot start relay; export {} with your API key",
                    relay.api_key_env
                )
            })?;

            let addr = format!("{}:{}", relay.host, relay.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            println!(
                "  {} Relay listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} {}",
                console::style("Forwarding to").dim(),
                console::style(upstream.url()).dim()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(http::RelayState {
                upstream: Arc::new(upstream),
            });

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Relay stopped.");
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
