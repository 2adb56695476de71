//! Async line input for the interactive chat.
//!
//! Wraps `rustyline_async::Readline` so replies printed through the
//! returned `SharedWriter` never tear the prompt line.

use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

/// What the user did at the prompt.
#[derive(Debug, PartialEq)]
pub enum InputEvent {
    /// A submitted line, trimmed. May be empty.
    Line(String),
    /// Ctrl+D, or the terminal went away.
    Eof,
    /// Ctrl+C.
    Interrupted,
}

pub struct ChatInput {
    rl: Readline,
}

impl ChatInput {
    /// Start reading with `prompt`. Output must go through the returned
    /// writer while the prompt is active.
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, writer) = Readline::new(prompt)?;
        Ok((Self { rl }, writer))
    }

    /// Wait for the next line. Non-empty lines are added to the history.
    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    self.rl.add_history_entry(line.clone());
                }
                InputEvent::Line(line)
            }
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(e) => {
                tracing::debug!(error = %e, "Readline failed, treating as EOF");
                InputEvent::Eof
            }
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.rl.clear() {
            tracing::debug!(error = %e, "Failed to clear screen");
        }
    }

    /// Restore the terminal before exiting.
    pub fn finish(mut self) {
        if let Err(e) = self.rl.flush() {
            tracing::debug!(error = %e, "Failed to flush readline");
        }
    }
}
