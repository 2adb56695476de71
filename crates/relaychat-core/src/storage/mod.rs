//! Persistence ports for relaychat.
//!
//! - `BlobStore`: durable string values under fixed keys
//! - `ChatStore`: the chat collection and endpoint records on top of a `BlobStore`

pub mod blob_store;
pub mod chat_store;
