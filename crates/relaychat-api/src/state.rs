//! Application state wiring the session controller to concrete infra.
//!
//! The controller is generic over its blob store; `AppState` pins it to the
//! file store under the data dir, or to process memory for `--ephemeral`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use relaychat_core::chat::controller::SessionController;
use relaychat_core::event::bus::EventBus;
use relaychat_core::llm::box_transport::BoxRelayTransport;
use relaychat_core::llm::dispatch::DispatchEngine;
use relaychat_core::storage::blob_store::{BlobStore, MemoryBlobStore};
use relaychat_core::storage::chat_store::ChatStore;
use relaychat_infra::config::load_client_config;
use relaychat_infra::relay::client::HttpRelayTransport;
use relaychat_infra::storage::file_blob::FileBlobStore;
use relaychat_infra::storage::resolve_data_dir;
use relaychat_types::config::ClientConfig;
use relaychat_types::error::StoreError;

/// Blob store chosen at startup.
#[derive(Debug)]
pub enum AppBlobStore {
    File(FileBlobStore),
    Memory(MemoryBlobStore),
}

impl BlobStore for AppBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            AppBlobStore::File(store) => store.get(key).await,
            AppBlobStore::Memory(store) => store.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            AppBlobStore::File(store) => store.put(key, value).await,
            AppBlobStore::Memory(store) => store.put(key, value).await,
        }
    }
}

pub type AppController = SessionController<AppBlobStore>;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: ClientConfig,
    /// Keep chats in memory only; nothing is read from or written to disk.
    pub ephemeral: bool,
}

impl AppState {
    /// Resolve the data dir and load `config.toml`.
    pub async fn init(ephemeral: bool) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        if !ephemeral {
            tokio::fs::create_dir_all(&data_dir)
                .await
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
        }
        let config = load_client_config(&data_dir).await;
        tracing::debug!(data_dir = %data_dir.display(), ephemeral, "App state initialized");

        Ok(Self {
            data_dir,
            config,
            ephemeral,
        })
    }

    fn blob_store(&self) -> AppBlobStore {
        if self.ephemeral {
            AppBlobStore::Memory(MemoryBlobStore::new())
        } else {
            AppBlobStore::File(FileBlobStore::new(self.data_dir.clone()))
        }
    }

    /// Build a controller over the saved chats and the HTTP relay client.
    pub async fn controller(&self) -> anyhow::Result<AppController> {
        let transport = HttpRelayTransport::new().context("failed to build HTTP client")?;
        let engine = DispatchEngine::new(
            BoxRelayTransport::new(transport),
            Duration::from_millis(self.config.timeout_ms),
        );

        Ok(SessionController::init(
            ChatStore::new(self.blob_store()),
            engine,
            self.config.clone(),
            EventBus::default(),
        )
        .await)
    }
}
