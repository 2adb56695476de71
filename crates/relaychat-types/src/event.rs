//! Presentation events published by the session controller.
//!
//! A presentation adapter (terminal, web view, ...) subscribes to these and
//! turns them into display updates. The core never depends on a UI toolkit.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatId, ChatMessage, ChatSummary};

/// Events emitted while chats are created, switched, and answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to a chat's history.
    MessageAppended {
        chat_id: ChatId,
        message: ChatMessage,
    },

    /// A turn is in flight; show a transient "thinking" placeholder.
    ThinkingStarted { chat_id: ChatId },

    /// The turn resolved; replace the placeholder with `message`
    /// (an assistant reply or an error).
    ThinkingEnded {
        chat_id: ChatId,
        message: ChatMessage,
    },

    /// The set of chats or their titles changed (newest first).
    ChatListChanged { chats: Vec<ChatSummary> },
}

impl ChatEvent {
    /// Chat this event concerns, if it is chat-scoped.
    pub fn chat_id(&self) -> Option<&ChatId> {
        match self {
            ChatEvent::MessageAppended { chat_id, .. }
            | ChatEvent::ThinkingStarted { chat_id }
            | ChatEvent::ThinkingEnded { chat_id, .. } => Some(chat_id),
            ChatEvent::ChatListChanged { .. } => None,
        }
    }
}
