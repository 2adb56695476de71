//! Business logic and port definitions for relaychat.
//!
//! This crate defines the "ports" (blob storage and relay transport traits)
//! that the infrastructure layer implements, plus everything that runs on
//! top of them: the chat session model, the fallback dispatch engine, and
//! the session controller. It depends only on `relaychat-types` -- never on
//! `relaychat-infra` or any HTTP/filesystem crate.

pub mod chat;
pub mod event;
pub mod llm;
pub mod storage;
