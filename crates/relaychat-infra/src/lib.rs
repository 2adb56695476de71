//! Infrastructure layer for relaychat.
//!
//! Implements the ports defined in `relaychat-core`: a file-backed blob
//! store and a reqwest relay transport. Also loads `config.toml`, resolves
//! the data directory, and provides the upstream client the bundled relay
//! server forwards through.

pub mod config;
pub mod relay;
pub mod storage;
