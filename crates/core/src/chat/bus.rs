//! Inbound message demultiplexing
//!
//! Every pending "wait for the next message" is a [`Registration`] keyed by
//! channel and expected author. The first matching inbound message resolves
//! it and removes it; dropping an unresolved registration removes it too.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tracing::trace;

use super::Message;
use crate::error::{Error, Result};

struct Waiter {
    id: u64,
    channel_id: String,
    author_id: Option<String>,
    tx: oneshot::Sender<Message>,
}

impl Waiter {
    fn wants(&self, message: &Message) -> bool {
        self.channel_id == message.channel_id
            && self
                .author_id
                .as_deref()
                .map_or(true, |author| author == message.author_id)
    }
}

#[derive(Default)]
pub struct MessageBus {
    next_id: AtomicU64,
    waiters: Mutex<Vec<Waiter>>,
}

impl MessageBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn waiters(&self) -> MutexGuard<'_, Vec<Waiter>> {
        // A panic while holding the lock cannot leave the list inconsistent
        self.waiters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for the next message in `channel_id`, optionally only from
    /// `author_id`
    pub fn register(self: &Arc<Self>, channel_id: &str, author_id: Option<&str>) -> Registration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        self.waiters().push(Waiter {
            id,
            channel_id: channel_id.to_string(),
            author_id: author_id.map(str::to_string),
            tx,
        });
        trace!(id, channel_id, ?author_id, "registered waiter");

        Registration {
            id,
            bus: Arc::clone(self),
            rx,
        }
    }

    /// Hands `message` to the oldest matching waiter. Returns the message
    /// back when nobody was waiting for it.
    pub fn dispatch(&self, message: Message) -> Option<Message> {
        let mut waiters = self.waiters();
        let mut message = message;

        while let Some(index) = waiters.iter().position(|w| w.wants(&message)) {
            let waiter = waiters.remove(index);
            match waiter.tx.send(message) {
                Ok(()) => {
                    trace!(id = waiter.id, "resolved waiter");
                    return None;
                }
                // Receiver went away between matching and sending
                Err(returned) => message = returned,
            }
        }

        Some(message)
    }

    pub fn pending(&self) -> usize {
        self.waiters().len()
    }

    fn unregister(&self, id: u64) {
        self.waiters().retain(|w| w.id != id);
    }
}

/// A single outstanding wait, torn down exactly once
pub struct Registration {
    id: u64,
    bus: Arc<MessageBus>,
    rx: oneshot::Receiver<Message>,
}

impl Registration {
    /// Suspends until a matching message arrives. There is no timeout.
    pub async fn recv(mut self) -> Result<Message> {
        (&mut self.rx).await.map_err(|_| Error::BusClosed)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.bus.unregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(channel: &str, author: &str, content: &str) -> Message {
        Message {
            id: format!("{}-{}", author, content),
            channel_id: channel.into(),
            author_id: author.into(),
            content: Some(content.into()),
            mentions: vec![],
        }
    }

    #[tokio::test]
    async fn test_filters_by_author() {
        let bus = MessageBus::new();
        let reg = bus.register("c1", Some("alice"));

        assert!(bus.dispatch(msg("c1", "bob", "hi")).is_some());
        assert!(bus.dispatch(msg("c1", "alice", "e2e4")).is_none());

        let got = reg.recv().await.unwrap();
        assert_eq!(got.content.as_deref(), Some("e2e4"));
        assert_eq!(bus.pending(), 0);
    }

    #[tokio::test]
    async fn test_filters_by_channel() {
        let bus = MessageBus::new();
        let _reg = bus.register("c1", Some("alice"));
        assert!(bus.dispatch(msg("c2", "alice", "e2e4")).is_some());
        assert_eq!(bus.pending(), 1);
    }

    #[tokio::test]
    async fn test_any_author() {
        let bus = MessageBus::new();
        let reg = bus.register("c1", None);
        assert!(bus.dispatch(msg("c1", "carol", "hello")).is_none());
        assert_eq!(reg.recv().await.unwrap().author_id, "carol");
    }

    #[test]
    fn test_dropped_registration_is_removed() {
        let bus = MessageBus::new();
        let reg = bus.register("c1", Some("alice"));
        assert_eq!(bus.pending(), 1);
        drop(reg);
        assert_eq!(bus.pending(), 0);
        assert!(bus.dispatch(msg("c1", "alice", "late")).is_some());
    }

    #[tokio::test]
    async fn test_one_message_resolves_one_waiter() {
        let bus = MessageBus::new();
        let first = bus.register("c1", Some("alice"));
        let second = bus.register("c1", Some("alice"));

        assert!(bus.dispatch(msg("c1", "alice", "one")).is_none());
        assert_eq!(bus.pending(), 1);
        assert!(bus.dispatch(msg("c1", "alice", "two")).is_none());

        assert_eq!(first.recv().await.unwrap().content.as_deref(), Some("one"));
        assert_eq!(second.recv().await.unwrap().content.as_deref(), Some("two"));
    }
}
