//! The language model client.
//!
//! [`MessagesClient`] speaks the Anthropic Messages API over HTTP. The
//! orchestrator only sees the [`LanguageModel`] trait, which keeps the
//! round-driving logic testable against in-memory fakes.

use crate::error::LlmError;
use crate::wire::{ModelRequest, RoundResult, ToolDefinition};
use async_trait::async_trait;
use std::time::Duration;
use threadrelay_conversation::{ContentBlock, Message};

/// API version header value required for tool use.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the model client.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate per round.
    pub max_tokens: u32,
    /// System prompt sent with every round.
    pub system_prompt: Option<String>,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl ModelConfig {
    /// Creates a configuration against the default API endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 2048,
            system_prompt: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the max tokens per round.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for driving model rounds.
///
/// Implementations do not mutate shared history and do not retry; both
/// concerns belong to the orchestrator.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends the opening call of a round: `history` plus a new plain-text
    /// user message built from `user_text`, advertising `tools` if given.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success provider
    /// status, a malformed response body, or timeout.
    async fn send(
        &self,
        history: &[Message],
        user_text: &str,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<RoundResult, LlmError>;

    /// Sends a follow-up call carrying tool results: `history` plus a user
    /// message whose content is the given `tool_result` blocks, in order.
    ///
    /// Tool definitions are never re-advertised on this call.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`LanguageModel::send`].
    async fn send_with_tool_results(
        &self,
        history: &[Message],
        tool_results: Vec<ContentBlock>,
    ) -> Result<RoundResult, LlmError>;
}

/// HTTP client for the Messages API.
#[derive(Debug, Clone)]
pub struct MessagesClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl MessagesClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: ModelConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    /// Returns the configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn call(
        &self,
        messages: Vec<Message>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<RoundResult, LlmError> {
        let request = ModelRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: self.config.system_prompt.clone(),
            messages,
            tools,
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "model provider error");
            return Err(LlmError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(classify_reqwest_error)?;
        let round: RoundResult =
            serde_json::from_str(&body).map_err(|e| LlmError::Decode {
                reason: e.to_string(),
            })?;
        tracing::info!(
            stop_reason = ?round.stop_reason,
            model = %round.model,
            "received model response"
        );
        Ok(round)
    }
}

#[async_trait]
impl LanguageModel for MessagesClient {
    async fn send(
        &self,
        history: &[Message],
        user_text: &str,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<RoundResult, LlmError> {
        let mut messages = history.to_vec();
        messages.push(Message::user_text(user_text));
        tracing::info!(
            model = %self.config.model,
            turns = messages.len(),
            advertising_tools = tools.is_some(),
            "sending model request"
        );
        self.call(messages, tools.map(<[ToolDefinition]>::to_vec))
            .await
    }

    async fn send_with_tool_results(
        &self,
        history: &[Message],
        tool_results: Vec<ContentBlock>,
    ) -> Result<RoundResult, LlmError> {
        let mut messages = history.to_vec();
        let result_count = tool_results.len();
        messages.push(Message::tool_results(tool_results));
        tracing::info!(
            model = %self.config.model,
            turns = messages.len(),
            tool_results = result_count,
            "sending follow-up model request"
        );
        self.call(messages, None).await
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ModelConfig::new("sk-test", "some-model")
            .with_base_url("http://localhost:8081")
            .with_system_prompt("You are terse.")
            .with_max_tokens(512)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.model, "some-model");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.system_prompt.as_deref(), Some("You are terse."));
    }

    #[test]
    fn client_construction() {
        let client =
            MessagesClient::new(ModelConfig::new("sk-test", "some-model")).expect("client");
        assert_eq!(client.model(), "some-model");
    }
}
