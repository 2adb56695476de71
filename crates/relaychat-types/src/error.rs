use thiserror::Error;

use crate::chat::ChatId;

/// Errors related to chat operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    #[error("no such chat: '{0}'")]
    NoSuchChat(ChatId),
}

/// Errors from the persistent store (read, write, or encode failures).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Errors related to client configuration changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid endpoint '{0}': expected an http:// or https:// URL")]
    InvalidEndpoint(String),

    #[error("unknown model '{0}'")]
    UnknownModel(String),
}

/// Errors surfaced by the session controller.
///
/// All of these are recoverable: the controller is left idle and usable.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::NoSuchChat(ChatId::from("missing"));
        assert_eq!(err.to_string(), "no such chat: 'missing'");
    }

    #[test]
    fn test_store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StoreError = io.into();
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_controller_error_is_transparent_for_chat() {
        let err: ControllerError = ChatError::NoSuchChat(ChatId::from("x")).into();
        assert_eq!(err.to_string(), "no such chat: 'x'");
    }
}
