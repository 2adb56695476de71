//! HTTP plumbing on both sides of the relay.
//!
//! - `client`: the chat client's transport, POSTing `{model, messages}` to a relay
//! - `upstream`: what the relay itself uses to reach the chat-completions API

pub mod client;
pub mod upstream;
