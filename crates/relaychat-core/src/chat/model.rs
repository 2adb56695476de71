//! In-memory chat session model.
//!
//! `ChatSessionModel` exclusively owns the chat collection while the program
//! runs. It enforces the ordering invariants (append-only, chronological),
//! titles chats after their first user message, and resolves the weak
//! active-chat pointer.

use relaychat_types::chat::{Chat, ChatCollection, ChatId, ChatMessage, ChatSummary, MessageRole};
use relaychat_types::error::ChatError;

use super::title::derive_title;
use crate::storage::blob_store::BlobStore;
use crate::storage::chat_store::ChatStore;

/// Owns all chats and the active-chat pointer.
#[derive(Debug, Default)]
pub struct ChatSessionModel {
    collection: ChatCollection,
}

impl ChatSessionModel {
    pub fn new(collection: ChatCollection) -> Self {
        if let Some(active) = &collection.active_id {
            if !collection.chats.contains_key(active) {
                tracing::debug!(chat_id = %active, "Saved active chat no longer exists");
            }
        }
        Self { collection }
    }

    /// Build the model from whatever the store holds (empty on first run).
    pub async fn init<B: BlobStore>(store: &ChatStore<B>) -> Self {
        Self::new(store.load().await)
    }

    /// The full collection, e.g. for persisting.
    pub fn collection(&self) -> &ChatCollection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Create an empty chat and make it the active one.
    pub fn create_chat(&mut self) -> &Chat {
        self.create_chat_with(ChatId::generate)
    }

    /// Create a chat using `next_id` for candidate ids, skipping any id that
    /// is already taken so two chats can never merge.
    pub(crate) fn create_chat_with(&mut self, mut next_id: impl FnMut() -> ChatId) -> &Chat {
        let mut id = next_id();
        while self.collection.chats.contains_key(&id) {
            tracing::debug!(chat_id = %id, "Generated chat id collides, regenerating");
            id = next_id();
        }

        tracing::info!(chat_id = %id, "Chat created");
        self.collection.active_id = Some(id.clone());
        self.collection
            .chats
            .entry(id.clone())
            .or_insert_with(|| Chat::new(id))
    }

    /// Append a message to the end of a chat's history.
    ///
    /// The first user message also sets the chat title. A timestamp earlier
    /// than the previous message's (clock skew) is raised to match it.
    pub fn append_message(
        &mut self,
        chat_id: &ChatId,
        mut message: ChatMessage,
    ) -> Result<&ChatMessage, ChatError> {
        let chat = self
            .collection
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| ChatError::NoSuchChat(chat_id.clone()))?;

        if let Some(last) = chat.messages.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }

        if message.role == MessageRole::User && !chat.has_user_message() {
            chat.title = derive_title(&message.content);
        }

        chat.messages.push(message);
        // Just pushed, so the history is non-empty.
        Ok(&chat.messages[chat.messages.len() - 1])
    }

    /// Switch the active chat. Leaves the pointer untouched on error.
    pub fn set_active(&mut self, chat_id: &ChatId) -> Result<(), ChatError> {
        if !self.collection.chats.contains_key(chat_id) {
            return Err(ChatError::NoSuchChat(chat_id.clone()));
        }
        self.collection.active_id = Some(chat_id.clone());
        Ok(())
    }

    /// The active chat id, or None when unset or pointing at a missing chat.
    pub fn active_id(&self) -> Option<&ChatId> {
        self.collection
            .active_id
            .as_ref()
            .filter(|id| self.collection.chats.contains_key(*id))
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.active_id().and_then(|id| self.collection.chats.get(id))
    }

    pub fn get(&self, chat_id: &ChatId) -> Option<&Chat> {
        self.collection.chats.get(chat_id)
    }

    /// All chats, newest first.
    pub fn list(&self) -> Vec<&Chat> {
        let mut chats: Vec<&Chat> = self.collection.chats.values().collect();
        chats.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        chats
    }

    /// Id and title of every chat, newest first.
    pub fn summaries(&self) -> Vec<ChatSummary> {
        self.list().into_iter().map(Chat::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_create_chat_becomes_active() {
        let mut model = ChatSessionModel::default();
        let id = model.create_chat().id.clone();

        assert_eq!(model.active_id(), Some(&id));
        assert_eq!(model.get(&id).unwrap().title, "New Chat");
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_create_chat_regenerates_colliding_id() {
        let mut model = ChatSessionModel::default();
        model.create_chat_with(|| ChatId::from("same"));

        let mut ids = vec![ChatId::from("other"), ChatId::from("same")];
        let second = model.create_chat_with(|| ids.pop().unwrap()).id.clone();

        assert_eq!(second, ChatId::from("other"));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_append_to_missing_chat_fails() {
        let mut model = ChatSessionModel::default();
        let missing = ChatId::from("nope");
        let err = model
            .append_message(&missing, ChatMessage::user("hi"))
            .unwrap_err();
        assert_eq!(err, ChatError::NoSuchChat(missing));
    }

    #[test]
    fn test_first_user_message_sets_title_once() {
        let mut model = ChatSessionModel::default();
        let id = model.create_chat().id.clone();

        model
            .append_message(&id, ChatMessage::user("What is a monad?"))
            .unwrap();
        model
            .append_message(&id, ChatMessage::assistant("A monoid in...", "m"))
            .unwrap();
        model
            .append_message(&id, ChatMessage::user("Explain like I'm five"))
            .unwrap();

        assert_eq!(model.get(&id).unwrap().title, "What is a monad?");
    }

    #[test]
    fn test_error_message_does_not_set_title() {
        let mut model = ChatSessionModel::default();
        let id = model.create_chat().id.clone();
        model
            .append_message(&id, ChatMessage::error("Error: All models busy. Try again."))
            .unwrap();
        assert_eq!(model.get(&id).unwrap().title, "New Chat");
    }

    #[test]
    fn test_messages_stay_chronological_under_clock_skew() {
        let mut model = ChatSessionModel::default();
        let id = model.create_chat().id.clone();

        let mut late = ChatMessage::user("first");
        late.timestamp = Utc::now() + Duration::seconds(60);
        model.append_message(&id, late).unwrap();

        let early = ChatMessage::assistant("second", "m");
        model.append_message(&id, early).unwrap();

        let messages = &model.get(&id).unwrap().messages;
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert!(messages[0].timestamp <= messages[1].timestamp);
    }

    #[test]
    fn test_set_active_missing_keeps_pointer() {
        let mut model = ChatSessionModel::default();
        let id = model.create_chat().id.clone();

        let result = model.set_active(&ChatId::from("ghost"));
        assert!(matches!(result, Err(ChatError::NoSuchChat(_))));
        assert_eq!(model.active_id(), Some(&id));
    }

    #[test]
    fn test_dangling_active_id_resolves_to_none() {
        let collection = ChatCollection {
            chats: Default::default(),
            active_id: Some(ChatId::from("gone")),
        };
        let model = ChatSessionModel::new(collection);
        assert!(model.active_id().is_none());
        assert!(model.active_chat().is_none());
    }

    #[test]
    fn test_list_is_newest_first() {
        let mut model = ChatSessionModel::default();
        let older = model.create_chat().id.clone();
        let newer = model.create_chat().id.clone();

        // Force distinct creation times regardless of clock resolution.
        model.collection.chats.get_mut(&older).unwrap().created_at =
            Utc::now() - Duration::seconds(10);

        let ids: Vec<ChatId> = model.list().into_iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![newer.clone(), older]);
        assert_eq!(model.summaries()[0].id, newer);
    }
}
