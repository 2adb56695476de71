//! Filesystem storage for relaychat.
//!
//! Provides the file-backed [`BlobStore`](relaychat_core::storage::blob_store::BlobStore)
//! and data directory resolution.

pub mod file_blob;

use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "RELAYCHAT_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `RELAYCHAT_DATA_DIR` environment variable
/// 2. `~/.relaychat`
/// 3. `.relaychat` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".relaychat");
    }

    PathBuf::from(".relaychat")
}
