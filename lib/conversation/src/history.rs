//! Per-conversation message history.
//!
//! The store is the only shared mutable state in the pipeline. Conversation
//! state lives for the process lifetime only; nothing is persisted.
//!
//! Concurrency discipline:
//! - different conversation keys never block each other
//! - the same key serializes: an exchange holds the key's guard for its full
//!   duration, so concurrent events on one thread cannot interleave their
//!   history mutations
//! - history is committed only at round completion, never mid-round

use crate::message::Message;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use threadrelay_core::ConversationKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory store of per-conversation message sequences.
///
/// Trimming is by recency count only: `commit` keeps the most recent
/// `cap` messages and drops the oldest. There is no eviction by time,
/// since conversations are expected to be few and long-lived.
#[derive(Debug)]
pub struct HistoryStore {
    cap: usize,
    entries: RwLock<HashMap<ConversationKey, Arc<Mutex<Vec<Message>>>>>,
}

impl HistoryStore {
    /// Creates a store that keeps at most `cap` messages per conversation.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the configured recency cap.
    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Acquires the per-key guard, creating an empty history if the
    /// conversation has not been seen before.
    ///
    /// Holding the guard serializes all access to this key's history;
    /// other keys remain fully concurrent.
    pub async fn lock(&self, key: &ConversationKey) -> HistoryGuard {
        let entry = self.entry(key);
        HistoryGuard {
            cap: self.cap,
            inner: entry.lock_owned().await,
        }
    }

    /// Returns a snapshot of the history for `key`.
    ///
    /// An unknown key yields an empty sequence; this never fails.
    pub async fn get(&self, key: &ConversationKey) -> Vec<Message> {
        self.lock(key).await.messages().to_vec()
    }

    /// Appends one message to the history for `key`.
    pub async fn append(&self, key: &ConversationKey, message: Message) {
        self.lock(key).await.inner.push(message);
    }

    /// Replaces the stored sequence for `key` with a size-capped copy of
    /// `full_history`, keeping the most recent messages.
    pub async fn commit(&self, key: &ConversationKey, full_history: Vec<Message>) {
        self.lock(key).await.commit(full_history);
    }

    fn entry(&self, key: &ConversationKey) -> Arc<Mutex<Vec<Message>>> {
        {
            let entries = self.entries.read().expect("history map lock poisoned");
            if let Some(entry) = entries.get(key) {
                return Arc::clone(entry);
            }
        }
        let mut entries = self.entries.write().expect("history map lock poisoned");
        Arc::clone(entries.entry(key.clone()).or_default())
    }
}

/// Exclusive access to one conversation's history.
///
/// The orchestrator holds this for the whole exchange: reads the snapshot
/// at the start, and commits (or discards) the working history at the end.
#[derive(Debug)]
pub struct HistoryGuard {
    cap: usize,
    inner: OwnedMutexGuard<Vec<Message>>,
}

impl HistoryGuard {
    /// Returns the currently stored messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.inner
    }

    /// Returns whether the conversation has no stored messages yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Replaces the stored sequence, keeping the last `cap` messages.
    pub fn commit(&mut self, mut full_history: Vec<Message>) {
        if full_history.len() > self.cap {
            full_history.drain(..full_history.len() - self.cap);
        }
        *self.inner = full_history;
    }

    /// Seeds the history with messages, applying the cap.
    ///
    /// Used the first time a conversation is seen in-process, when prior
    /// turns are recovered from the channel transcript.
    pub fn seed(&mut self, messages: Vec<Message>) {
        self.commit(messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> ConversationKey {
        ConversationKey::from_parts("C1", &format!("{n}.0"))
    }

    #[tokio::test]
    async fn get_unknown_key_is_empty() {
        let store = HistoryStore::new(20);
        assert!(store.get(&key(1)).await.is_empty());
    }

    #[tokio::test]
    async fn append_then_get() {
        let store = HistoryStore::new(20);
        store.append(&key(1), Message::user_text("hello")).await;
        store.append(&key(1), Message::assistant_text("hi")).await;

        let history = store.get(&key(1)).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user_text("hello"));
    }

    #[tokio::test]
    async fn commit_caps_to_most_recent_in_order() {
        let store = HistoryStore::new(3);
        let full: Vec<Message> = (0..5).map(|i| Message::user_text(format!("m{i}"))).collect();

        store.commit(&key(1), full).await;

        let history = store.get(&key(1)).await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], Message::user_text("m2"));
        assert_eq!(history[2], Message::user_text("m4"));
    }

    #[tokio::test]
    async fn repeated_append_and_commit_never_exceeds_cap() {
        let store = HistoryStore::new(4);
        for i in 0..10 {
            store.append(&key(1), Message::user_text(format!("u{i}"))).await;
            let working = store.get(&key(1)).await;
            store.commit(&key(1), working).await;
            assert!(store.get(&key(1)).await.len() <= 4);
        }
        let history = store.get(&key(1)).await;
        assert_eq!(history.last(), Some(&Message::user_text("u9")));
    }

    #[tokio::test]
    async fn keys_are_isolated() {
        let store = HistoryStore::new(20);
        store.append(&key(1), Message::user_text("a")).await;
        store.append(&key(2), Message::user_text("b")).await;

        assert_eq!(store.get(&key(1)).await.len(), 1);
        assert_eq!(store.get(&key(2)).await.len(), 1);
    }

    #[tokio::test]
    async fn guard_serializes_same_key() {
        let store = Arc::new(HistoryStore::new(20));
        let guard = store.lock(&key(1)).await;

        let contender = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.append(&key(1), Message::user_text("late")).await;
            })
        };

        // The spawned append cannot complete while the guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.expect("append task");
        assert_eq!(store.get(&key(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn seed_applies_cap() {
        let store = HistoryStore::new(2);
        let mut guard = store.lock(&key(1)).await;
        guard.seed(vec![
            Message::user_text("oldest"),
            Message::assistant_text("middle"),
            Message::user_text("newest"),
        ]);
        assert_eq!(guard.messages().len(), 2);
        assert_eq!(guard.messages()[1], Message::user_text("newest"));
    }
}
