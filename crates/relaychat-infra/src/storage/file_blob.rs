//! File-backed blob store: one `{key}.json` file per key.
//!
//! Writes go to a sibling temp file that is then renamed over the target,
//! so a crash mid-write leaves either the old document or the new one,
//! never a torn mix.

use std::path::{Path, PathBuf};

use relaychat_core::storage::blob_store::BlobStore;
use relaychat_types::error::StoreError;

/// Blob store rooted at a directory (normally the data dir).
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(format!("read {}: {err}", path.display()))),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Io(format!("create {}: {e}", self.dir.display())))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| StoreError::Io(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Io(format!("rename to {}: {e}", path.display())))?;

        tracing::debug!(key, bytes = value.len(), "Blob written");
        Ok(())
    }
}
