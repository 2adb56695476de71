//! Relay request handlers.

pub mod relay;
