//! Broadcast event bus for distributing `ChatEvent` to presentation adapters.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active subscribers
//! is a no-op, so the controller runs the same headless (`relaychat send`)
//! as it does under the interactive terminal.

use relaychat_types::event::ChatEvent;
use tokio::sync::broadcast;

/// Default channel capacity; a turn emits at most a handful of events.
pub const DEFAULT_CAPACITY: usize = 256;

/// Multi-consumer bus for chat events.
///
/// Cloning the bus clones the sender, so any clone can publish and every
/// subscriber sees every event published after it subscribed.
pub struct EventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers. Dropped when nobody listens.
    pub fn publish(&self, event: ChatEvent) {
        let _ = self.sender.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaychat_types::chat::ChatId;

    fn thinking(id: &str) -> ChatEvent {
        ChatEvent::ThinkingStarted {
            chat_id: ChatId::from(id),
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(thinking("c1"));

        assert_eq!(rx1.recv().await.unwrap(), thinking("c1"));
        assert_eq!(rx2.recv().await.unwrap(), thinking("c1"));
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = EventBus::default();
        bus.publish(thinking("c1"));
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn clone_shares_channel() {
        let bus = EventBus::new(16);
        let other = bus.clone();
        let mut rx = bus.subscribe();

        other.publish(thinking("c2"));

        assert_eq!(rx.try_recv().unwrap(), thinking("c2"));
        assert!(format!("{bus:?}").contains("receiver_count"));
    }
}
