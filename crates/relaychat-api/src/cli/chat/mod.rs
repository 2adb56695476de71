//! Interactive terminal chat.
//!
//! The loop reads lines, turns slash commands into controller calls, and
//! sends everything else as a turn. A [`presenter::TerminalPresenter`]
//! subscribed to the controller's events does all of the drawing.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod presenter;
pub mod renderer;
