//! Conversation keys.
//!
//! A conversation key groups every turn of one logical chat thread. On
//! thread-capable chat surfaces it is derived from the channel id and the
//! thread root timestamp; replies outside a thread use the message's own
//! timestamp as the root.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for one logical conversation.
///
/// Keys are treated as opaque strings everywhere except construction:
/// the history store, orchestrator, and delivery adapter only compare and
/// hash them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Derives a key from a channel id and the thread root timestamp.
    #[must_use]
    pub fn from_parts(channel: &str, thread_root_ts: &str) -> Self {
        Self(format!("{channel}-{thread_root_ts}"))
    }

    /// Wraps an already-derived key value.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ConversationKey> for String {
    fn from(key: ConversationKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_parts() {
        let key = ConversationKey::from_parts("C024BE91L", "1712345678.000100");
        assert_eq!(key.as_str(), "C024BE91L-1712345678.000100");
    }

    #[test]
    fn same_thread_same_key() {
        let a = ConversationKey::from_parts("C024BE91L", "1712345678.000100");
        let b = ConversationKey::from_parts("C024BE91L", "1712345678.000100");
        assert_eq!(a, b);
    }

    #[test]
    fn different_threads_differ() {
        let a = ConversationKey::from_parts("C024BE91L", "1712345678.000100");
        let b = ConversationKey::from_parts("C024BE91L", "1712345679.000200");
        assert_ne!(a, b);
    }

    #[test]
    fn key_serde_is_transparent() {
        let key = ConversationKey::from_parts("C1", "42.0");
        let json = serde_json::to_string(&key).expect("serialize");
        assert_eq!(json, "\"C1-42.0\"");
    }
}
