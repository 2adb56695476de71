//! BlobStore trait and in-memory implementation.
//!
//! A blob store maps fixed string keys to whole serialized documents. Every
//! `put` replaces the previous value entirely; there are no partial writes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use relaychat_types::error::StoreError;

/// Trait for durable key -> document storage.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// The file-backed implementation lives in relaychat-infra.
pub trait BlobStore: Send + Sync {
    /// Read the value stored under `key`. Returns None if nothing is stored.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the value stored under `key`.
    fn put(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Process-local blob store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
    read_only: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail with an I/O error.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Raw value under `key`, bypassing the async interface.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Insert a raw value, e.g. to simulate a corrupted document.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Io("blob store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Io(format!("store is read-only, cannot write '{key}'")));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Io("blob store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
