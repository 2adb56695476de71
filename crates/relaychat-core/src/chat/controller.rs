//! Session controller: runs one user turn at a time per chat.
//!
//! A turn appends the user message, marks the chat pending, asks the
//! dispatch engine for a reply, appends the reply (or an error message),
//! persists, and returns the chat to idle. Presentation adapters follow
//! along through [`ChatEvent`]s on the [`EventBus`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use relaychat_types::chat::{Chat, ChatId, ChatMessage, ChatSummary, MessageRole};
use relaychat_types::config::ClientConfig;
use relaychat_types::error::{ChatError, ConfigError, ControllerError};
use relaychat_types::event::ChatEvent;
use relaychat_types::llm::{
    CandidateStatusInfo, DispatchError, DispatchSuccess, ModelCandidate, PromptMessage,
};

use super::model::ChatSessionModel;
use crate::event::bus::EventBus;
use crate::llm::dispatch::DispatchEngine;
use crate::storage::blob_store::BlobStore;
use crate::storage::chat_store::ChatStore;

/// Diagnostic appended when every candidate failed. Carries no URL or secret.
pub const ALL_MODELS_BUSY: &str = "Error: All models busy. Try again.";

/// Whether a chat has a turn in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Pending,
}

/// A turn that has been started but not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub chat_id: ChatId,
    /// System prompt followed by the chat history, error messages omitted.
    pub messages: Vec<PromptMessage>,
    pub candidates: Vec<ModelCandidate>,
    /// The turn had to create a chat because none was active.
    pub created_chat: bool,
}

/// Result of a resolved turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub chat_id: ChatId,
    /// The assistant reply or the error message that was appended.
    pub message: ChatMessage,
    pub model_used: Option<String>,
    /// Set when the turn completed in memory but could not be saved.
    pub persistence_error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Blank input, or the chat already had a turn in flight.
    Ignored,
    Completed(TurnReport),
}

/// Chats with a turn in flight, shared with [`PendingGuard`]s.
#[derive(Debug, Clone, Default)]
struct PendingChats(Arc<Mutex<HashSet<ChatId>>>);

impl PendingChats {
    fn contains(&self, chat_id: &ChatId) -> bool {
        self.0
            .lock()
            .map(|set| set.contains(chat_id))
            .unwrap_or(false)
    }

    fn insert(&self, chat_id: ChatId) {
        if let Ok(mut set) = self.0.lock() {
            set.insert(chat_id);
        }
    }

    fn remove(&self, chat_id: &ChatId) {
        if let Ok(mut set) = self.0.lock() {
            set.remove(chat_id);
        }
    }
}

/// Clears a chat's pending mark when dropped, so a turn future that is
/// cancelled mid-dispatch never leaves the chat stuck.
struct PendingGuard {
    pending: PendingChats,
    chat_id: ChatId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.remove(&self.chat_id);
    }
}

/// Orchestrates chats, persistence, and dispatch.
pub struct SessionController<B: BlobStore> {
    model: ChatSessionModel,
    store: ChatStore<B>,
    engine: DispatchEngine,
    bus: EventBus,
    config: ClientConfig,
    endpoint: String,
    preferred_model: Option<String>,
    pending: PendingChats,
    last_model_used: Option<String>,
}

impl<B: BlobStore> SessionController<B> {
    /// Load saved chats and the saved endpoint, then wire everything up.
    ///
    /// A saved endpoint wins over `config.endpoint`. An unknown
    /// `config.preferred_model` is logged and ignored.
    pub async fn init(
        store: ChatStore<B>,
        engine: DispatchEngine,
        config: ClientConfig,
        bus: EventBus,
    ) -> Self {
        let model = ChatSessionModel::init(&store).await;
        let endpoint = store
            .load_endpoint()
            .await
            .unwrap_or_else(|| config.endpoint.clone());

        let preferred_model = config.preferred_model.clone().filter(|preferred| {
            let known = config.model_names().contains(&preferred.as_str());
            if !known {
                tracing::warn!(model = %preferred, "Preferred model is not in the ladder, ignoring");
            }
            known
        });

        tracing::info!(
            chats = model.len(),
            endpoint = %endpoint,
            models = config.models.len(),
            "Session controller ready"
        );

        Self {
            model,
            store,
            engine,
            bus,
            config,
            endpoint,
            preferred_model,
            pending: PendingChats::default(),
            last_model_used: None,
        }
    }

    /// Run one complete turn for the active chat.
    #[tracing::instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn send_turn(&mut self, text: &str) -> Result<TurnOutcome, ControllerError> {
        let Some(turn) = self.begin_turn(text)? else {
            return Ok(TurnOutcome::Ignored);
        };
        let _guard = PendingGuard {
            pending: self.pending.clone(),
            chat_id: turn.chat_id.clone(),
        };

        if turn.created_chat {
            if let Err(err) = self.store.save(self.model.collection()).await {
                tracing::warn!(error = %err, "Failed to persist new chat");
            }
        }

        let result = self.engine.resolve(&turn.candidates, &turn.messages).await;
        let report = self.finish_turn(turn, result).await?;
        Ok(TurnOutcome::Completed(report))
    }

    /// Start a turn: validate, append the user message, and mark pending.
    ///
    /// Returns `None` (no side effects) for blank text or when the active
    /// chat already has a turn in flight. Creates a chat when none is active;
    /// the caller persists it.
    pub fn begin_turn(&mut self, text: &str) -> Result<Option<PendingTurn>, ControllerError> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank message");
            return Ok(None);
        }
        let text = text.trim();

        if let Some(active) = self.model.active_id() {
            if self.pending.contains(active) {
                tracing::debug!(chat_id = %active, "Turn already pending, ignoring message");
                return Ok(None);
            }
        }

        let (chat_id, created_chat) = match self.model.active_id().cloned() {
            Some(id) => (id, false),
            None => (self.model.create_chat().id.clone(), true),
        };

        let title_before = self.title_of(&chat_id);
        let message = self
            .model
            .append_message(&chat_id, ChatMessage::user(text))?
            .clone();
        self.bus.publish(ChatEvent::MessageAppended {
            chat_id: chat_id.clone(),
            message,
        });
        if created_chat || self.title_of(&chat_id) != title_before {
            self.publish_chat_list();
        }

        let messages = match self.model.get(&chat_id) {
            Some(chat) => self.request_messages(chat),
            None => return Err(ChatError::NoSuchChat(chat_id).into()),
        };

        self.pending.insert(chat_id.clone());
        self.bus.publish(ChatEvent::ThinkingStarted {
            chat_id: chat_id.clone(),
        });

        Ok(Some(PendingTurn {
            chat_id,
            messages,
            candidates: self.candidates(),
            created_chat,
        }))
    }

    /// Resolve a started turn with the dispatch result.
    ///
    /// Appends the reply or the error message, persists, and returns the
    /// chat to idle. A save failure does not fail the turn; it is reported
    /// in [`TurnReport::persistence_error`].
    pub async fn finish_turn(
        &mut self,
        turn: PendingTurn,
        result: Result<DispatchSuccess, DispatchError>,
    ) -> Result<TurnReport, ControllerError> {
        self.pending.remove(&turn.chat_id);

        let (reply, model_used) = match result {
            Ok(success) => {
                self.last_model_used = Some(success.model_used.clone());
                let model_used = success.model_used.clone();
                (
                    ChatMessage::assistant(success.content, success.model_used),
                    Some(model_used),
                )
            }
            Err(err) => {
                tracing::warn!(chat_id = %turn.chat_id, error = %err, "Turn failed");
                (ChatMessage::error(ALL_MODELS_BUSY), None)
            }
        };

        let message = self.model.append_message(&turn.chat_id, reply)?.clone();
        self.bus.publish(ChatEvent::ThinkingEnded {
            chat_id: turn.chat_id.clone(),
            message: message.clone(),
        });

        let persistence_error = match self.store.save(self.model.collection()).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(chat_id = %turn.chat_id, error = %err, "Failed to persist turn");
                Some(err.to_string())
            }
        };

        Ok(TurnReport {
            chat_id: turn.chat_id,
            message,
            model_used,
            persistence_error,
        })
    }

    /// Create an empty chat, make it active, and persist.
    ///
    /// On a save failure the chat still exists in memory.
    pub async fn create_chat(&mut self) -> Result<ChatId, ControllerError> {
        let chat_id = self.model.create_chat().id.clone();
        self.publish_chat_list();
        self.store.save(self.model.collection()).await?;
        Ok(chat_id)
    }

    /// Make `chat_id` the active chat and persist.
    pub async fn switch_chat(&mut self, chat_id: &ChatId) -> Result<(), ControllerError> {
        self.model.set_active(chat_id)?;
        tracing::info!(chat_id = %chat_id, "Switched chat");
        self.store.save(self.model.collection()).await?;
        Ok(())
    }

    /// Point every ladder model without its own endpoint at `url` and persist it.
    pub async fn update_endpoint(&mut self, url: &str) -> Result<(), ControllerError> {
        let url = url.trim();
        if !is_http_url(url) {
            return Err(ConfigError::InvalidEndpoint(url.to_string()).into());
        }
        self.endpoint = url.to_string();
        tracing::info!(endpoint = %url, "Relay endpoint updated");
        self.store.save_endpoint(url).await?;
        Ok(())
    }

    /// Try `model` first on subsequent turns. The rest keep their order.
    pub fn select_model(&mut self, model: &str) -> Result<(), ConfigError> {
        if !self.config.model_names().contains(&model) {
            return Err(ConfigError::UnknownModel(model.to_string()));
        }
        tracing::info!(model = %model, "Preferred model selected");
        self.preferred_model = Some(model.to_string());
        Ok(())
    }

    /// Save the whole collection (teardown).
    pub async fn flush(&self) -> Result<(), ControllerError> {
        self.store.save(self.model.collection()).await?;
        tracing::debug!(chats = self.model.len(), "Chats flushed");
        Ok(())
    }

    /// Candidate list the next turn will use, in fallback order.
    pub fn candidates(&self) -> Vec<ModelCandidate> {
        self.config
            .candidates(&self.endpoint, self.preferred_model.as_deref())
    }

    pub fn state(&self, chat_id: &ChatId) -> TurnState {
        if self.pending.contains(chat_id) {
            TurnState::Pending
        } else {
            TurnState::Idle
        }
    }

    /// Model that answered the most recent successful turn.
    pub fn last_model_used(&self) -> Option<&str> {
        self.last_model_used.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &ChatSessionModel {
        &self.model
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.model.active_chat()
    }

    pub fn chats(&self) -> Vec<ChatSummary> {
        self.model.summaries()
    }

    pub fn store(&self) -> &ChatStore<B> {
        &self.store
    }

    /// Per-model call statistics in current candidate order.
    pub fn status(&self) -> Vec<CandidateStatusInfo> {
        self.engine.status(&self.candidates())
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChatEvent> {
        self.bus.subscribe()
    }

    fn title_of(&self, chat_id: &ChatId) -> Option<String> {
        self.model.get(chat_id).map(|chat| chat.title.clone())
    }

    fn publish_chat_list(&self) {
        self.bus.publish(ChatEvent::ChatListChanged {
            chats: self.model.summaries(),
        });
    }

    fn request_messages(&self, chat: &Chat) -> Vec<PromptMessage> {
        std::iter::once(PromptMessage::system(&self.config.system_prompt))
            .chain(chat.messages.iter().filter_map(|m| match m.role {
                MessageRole::User => Some(PromptMessage::user(&m.content)),
                MessageRole::Assistant => Some(PromptMessage::assistant(&m.content)),
                MessageRole::Error => None,
            }))
            .collect()
    }
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains(char::is_whitespace))
    })
}
