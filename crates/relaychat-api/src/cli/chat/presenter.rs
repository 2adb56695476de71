//! Terminal presentation of controller events.
//!
//! The presenter is the only thing that draws replies. It consumes
//! [`ChatEvent`]s from the bus: a spinner while a turn is in flight, then
//! the rendered reply (or the error line) with a model footer.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

use relaychat_types::chat::{ChatMessage, MessageRole};
use relaychat_types::event::ChatEvent;

use super::renderer::ChatRenderer;

pub struct TerminalPresenter<W: Write> {
    out: W,
    renderer: ChatRenderer,
    show_spinner: bool,
    spinner: Option<ProgressBar>,
    thinking_since: Option<Instant>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, renderer: ChatRenderer, show_spinner: bool) -> Self {
        Self {
            out,
            renderer,
            show_spinner,
            spinner: None,
            thinking_since: None,
        }
    }

    /// Draw one event.
    pub fn handle(&mut self, event: &ChatEvent) -> io::Result<()> {
        match event {
            ChatEvent::ThinkingStarted { chat_id } => {
                tracing::trace!(chat_id = %chat_id, "Thinking");
                self.thinking_since = Some(Instant::now());
                self.start_spinner();
            }
            ChatEvent::ThinkingEnded { message, .. } => {
                self.stop_spinner();
                let elapsed = self
                    .thinking_since
                    .take()
                    .map(|since| since.elapsed())
                    .unwrap_or(Duration::ZERO);
                self.print_reply(message, elapsed)?;
            }
            // The prompt already shows what the user typed.
            ChatEvent::MessageAppended { .. } => {}
            ChatEvent::ChatListChanged { chats } => {
                tracing::trace!(chats = chats.len(), "Chat list changed");
            }
        }
        self.out.flush()
    }

    /// Draw events until the bus closes, then hand the writer back.
    pub async fn run(mut self, mut rx: Receiver<ChatEvent>) -> W {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event) {
                        tracing::warn!(error = %e, "Failed to draw chat event");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Presenter fell behind, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        self.stop_spinner();
        self.out
    }

    fn print_reply(&mut self, message: &ChatMessage, elapsed: Duration) -> io::Result<()> {
        match message.role {
            MessageRole::Assistant => {
                let rendered = self.renderer.render_final(&message.content);
                writeln!(self.out)?;
                writeln!(self.out, "{}", rendered.trim_end())?;
                if let Some(model) = &message.model {
                    writeln!(self.out, "{}", self.renderer.footer(model, elapsed))?;
                }
                writeln!(self.out)?;
            }
            MessageRole::Error => {
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "  {} {}",
                    style("!").red().bold(),
                    style(&message.content).red()
                )?;
                writeln!(
                    self.out,
                    "  {}",
                    style("Type a message to retry, /exit to quit.").dim()
                )?;
                writeln!(self.out)?;
            }
            MessageRole::User => {}
        }
        Ok(())
    }

    fn start_spinner(&mut self) {
        self.stop_spinner();
        let spinner = if self.show_spinner {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("Thinking...");
        if self.show_spinner {
            spinner.enable_steady_tick(Duration::from_millis(80));
        }
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaychat_types::chat::ChatId;
    use tokio::sync::broadcast;

    fn presenter() -> TerminalPresenter<Vec<u8>> {
        console::set_colors_enabled(false);
        TerminalPresenter::new(Vec::new(), ChatRenderer::new(false), false)
    }

    fn text(presenter: &TerminalPresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.out.clone()).unwrap()
    }

    #[test]
    fn reply_is_drawn_with_model_footer() {
        let mut presenter = presenter();
        let chat_id = ChatId::from("c1");

        presenter
            .handle(&ChatEvent::ThinkingStarted {
                chat_id: chat_id.clone(),
            })
            .unwrap();
        assert!(presenter.spinner.is_some());

        presenter
            .handle(&ChatEvent::ThinkingEnded {
                chat_id,
                message: ChatMessage::assistant("Hi there", "mistral-7b"),
            })
            .unwrap();

        assert!(presenter.spinner.is_none());
        let out = text(&presenter);
        assert!(out.contains("Hi there"));
        assert!(out.contains("| mistral-7b"));
    }

    #[test]
    fn error_reply_shows_retry_hint() {
        let mut presenter = presenter();
        presenter
            .handle(&ChatEvent::ThinkingEnded {
                chat_id: ChatId::from("c1"),
                message: ChatMessage::error("Error: All models busy. Try again."),
            })
            .unwrap();

        let out = text(&presenter);
        assert!(out.contains("All models busy"));
        assert!(out.contains("retry"));
    }

    #[test]
    fn user_messages_are_not_echoed() {
        let mut presenter = presenter();
        presenter
            .handle(&ChatEvent::MessageAppended {
                chat_id: ChatId::from("c1"),
                message: ChatMessage::user("secret question"),
            })
            .unwrap();
        assert!(text(&presenter).is_empty());
    }

    #[tokio::test]
    async fn run_stops_when_bus_closes() {
        let (tx, rx) = broadcast::channel(8);
        let task = tokio::spawn(presenter().run(rx));

        tx.send(ChatEvent::ThinkingEnded {
            chat_id: ChatId::from("c1"),
            message: ChatMessage::assistant("done", "m1"),
        })
        .unwrap();
        drop(tx);

        let out = task.await.unwrap();
        assert!(String::from_utf8(out).unwrap().contains("done"));
    }
}
