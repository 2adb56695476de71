//! Shared domain types for relaychat.
//!
//! This crate contains the core domain types used across the workspace:
//! chats and their messages, dispatch candidates and relay wire shapes,
//! presentation events, client configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
