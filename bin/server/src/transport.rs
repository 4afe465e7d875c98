//! Webhook-backed chat transport.
//!
//! The chat surface sits behind a relay service: replies are posted to
//! its webhook as `{conversation_key, text}`, and prior thread messages
//! are fetched from an optional history endpoint that answers with
//! `[{author_is_bot, text}, ...]`, oldest first, excluding the
//! triggering message.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use threadrelay_core::ConversationKey;
use threadrelay_delivery::{ChatTransport, DeliveryError, TranscriptEntry};

/// [`ChatTransport`] over the relay webhook contract.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    http: reqwest::Client,
    post_url: String,
    history_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    conversation_key: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct HistoryRequest<'a> {
    conversation_key: &'a str,
    limit: usize,
}

impl WebhookTransport {
    /// Creates a transport posting to `post_url`, optionally fetching
    /// history from `history_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        post_url: impl Into<String>,
        history_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::PostFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            post_url: post_url.into(),
            history_url,
        })
    }
}

#[async_trait]
impl ChatTransport for WebhookTransport {
    async fn post(&self, key: &ConversationKey, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(&self.post_url)
            .json(&OutboundMessage {
                conversation_key: key.as_str(),
                text,
            })
            .send()
            .await
            .map_err(|e| DeliveryError::PostFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::PostFailed {
                reason: format!("webhook answered status {}", status.as_u16()),
            });
        }
        Ok(())
    }

    async fn fetch_history(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> Result<Vec<TranscriptEntry>, DeliveryError> {
        let Some(history_url) = &self.history_url else {
            return Ok(Vec::new());
        };

        let response = self
            .http
            .post(history_url)
            .json(&HistoryRequest {
                conversation_key: key.as_str(),
                limit,
            })
            .send()
            .await
            .map_err(|e| DeliveryError::HistoryFetchFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::HistoryFetchFailed {
                reason: format!("history endpoint answered status {}", status.as_u16()),
            });
        }

        response
            .json::<Vec<TranscriptEntry>>()
            .await
            .map_err(|e| DeliveryError::HistoryFetchFailed {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_message_wire_shape() {
        let key = ConversationKey::from_parts("C024BE91L", "1712345678.000100");
        let body = serde_json::to_value(OutboundMessage {
            conversation_key: key.as_str(),
            text: "hello",
        })
        .expect("serialize");
        assert_eq!(body["conversation_key"], "C024BE91L-1712345678.000100");
        assert_eq!(body["text"], "hello");
    }

    #[tokio::test]
    async fn missing_history_url_yields_empty_transcript() {
        let transport = WebhookTransport::new(
            "http://localhost:9/post",
            None,
            Duration::from_secs(5),
        )
        .expect("transport");
        let key = ConversationKey::from_parts("C1", "100.0");
        let entries = transport.fetch_history(&key, 10).await.expect("fetch");
        assert!(entries.is_empty());
    }
}
