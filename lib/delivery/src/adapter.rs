//! The chat surface boundary.

use crate::error::DeliveryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use threadrelay_core::ConversationKey;

/// One prior message recovered from the channel transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Whether the message was authored by this bot.
    pub author_is_bot: bool,
    /// The posted text.
    pub text: String,
}

/// Trait for the chat-platform transport.
///
/// Implementations own event verification and API specifics; the core
/// only posts text into the thread identified by the conversation key and
/// fetches prior messages to seed history the first time a conversation
/// is seen in-process.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Posts one text message into the conversation's thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the post fails; callers log and move on.
    async fn post(&self, key: &ConversationKey, text: &str) -> Result<(), DeliveryError>;

    /// Fetches up to `limit` prior messages of the conversation, oldest
    /// first, excluding the triggering message.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    async fn fetch_history(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> Result<Vec<TranscriptEntry>, DeliveryError>;
}
