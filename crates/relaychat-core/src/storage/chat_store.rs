//! Chat collection persistence on top of a [`BlobStore`].
//!
//! The whole collection is one JSON document under [`CHATS_KEY`]; the relay
//! endpoint is a second record under [`ENDPOINT_KEY`]. Every save rewrites
//! the full document.

use relaychat_types::chat::ChatCollection;
use relaychat_types::error::StoreError;

use super::blob_store::BlobStore;

/// Key of the serialized chat collection.
pub const CHATS_KEY: &str = "chats";

/// Key of the configured relay endpoint URL.
pub const ENDPOINT_KEY: &str = "endpoint";

/// Loads and saves the chat collection and endpoint record.
pub struct ChatStore<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> ChatStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// Access the underlying blob store.
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Load the chat collection.
    ///
    /// Returns an empty collection when nothing was saved yet, when the read
    /// fails, or when the stored document does not parse. None of these are
    /// fatal; the latter two are logged.
    pub async fn load(&self) -> ChatCollection {
        let raw = match self.blobs.get(CHATS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("No saved chats, starting empty");
                return ChatCollection::default();
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read saved chats, starting empty");
                return ChatCollection::default();
            }
        };

        match serde_json::from_str::<ChatCollection>(&raw) {
            Ok(collection) => {
                tracing::debug!(chats = collection.len(), "Loaded saved chats");
                collection
            }
            Err(err) => {
                tracing::warn!(error = %err, "Saved chats are corrupted, starting empty");
                ChatCollection::default()
            }
        }
    }

    /// Write the entire collection as a single document.
    pub async fn save(&self, collection: &ChatCollection) -> Result<(), StoreError> {
        let raw = serde_json::to_string(collection)?;
        self.blobs.put(CHATS_KEY, &raw).await
    }

    /// Load the saved relay endpoint, if one was configured.
    pub async fn load_endpoint(&self) -> Option<String> {
        match self.blobs.get(ENDPOINT_KEY).await {
            Ok(value) => value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read saved endpoint");
                None
            }
        }
    }

    pub async fn save_endpoint(&self, endpoint: &str) -> Result<(), StoreError> {
        self.blobs.put(ENDPOINT_KEY, endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::blob_store::MemoryBlobStore;
    use relaychat_types::chat::{Chat, ChatId, ChatMessage};

    fn sample_collection() -> ChatCollection {
        let mut collection = ChatCollection::default();
        for text in ["first chat", "second chat"] {
            let mut chat = Chat::new(ChatId::generate());
            chat.title = text.to_string();
            chat.messages.push(ChatMessage::user(text));
            chat.messages.push(ChatMessage::assistant("ok", "m1"));
            collection.active_id = Some(chat.id.clone());
            collection.chats.insert(chat.id.clone(), chat);
        }
        collection
    }

    #[tokio::test]
    async fn test_load_without_data_is_empty() {
        let store = ChatStore::new(MemoryBlobStore::new());
        let collection = store.load().await;
        assert!(collection.is_empty());
        assert!(collection.active_id.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupted_data_is_empty() {
        let blobs = MemoryBlobStore::new();
        blobs.insert_raw(CHATS_KEY, "{not json");
        let store = ChatStore::new(blobs);

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_restores_collection() {
        let store = ChatStore::new(MemoryBlobStore::new());
        let collection = sample_collection();

        store.save(&collection).await.unwrap();
        let loaded = store.load().await;

        assert_eq!(loaded, collection);
    }

    #[tokio::test]
    async fn test_save_of_loaded_collection_is_byte_identical() {
        let store = ChatStore::new(MemoryBlobStore::new());
        store.save(&sample_collection()).await.unwrap();
        let before = store.blobs().raw(CHATS_KEY).unwrap();

        let loaded = store.load().await;
        store.save(&loaded).await.unwrap();
        let after = store.blobs().raw(CHATS_KEY).unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let store = ChatStore::new(MemoryBlobStore::new());
        store.blobs().set_read_only(true);

        let result = store.save(&sample_collection()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_endpoint_roundtrip_and_blank() {
        let store = ChatStore::new(MemoryBlobStore::new());
        assert!(store.load_endpoint().await.is_none());

        store.save_endpoint("https://relay.example.dev").await.unwrap();
        assert_eq!(
            store.load_endpoint().await.as_deref(),
            Some("https://relay.example.dev")
        );

        store.save_endpoint("   ").await.unwrap();
        assert!(store.load_endpoint().await.is_none());
    }
}
