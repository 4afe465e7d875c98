//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables with a `__`
//! section separator (e.g. `MODEL__API_KEY`, `CHAT__POST_URL`).

use serde::Deserialize;

/// Server configuration composed from section configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Language model configuration.
    pub model: ModelSettings,

    /// Chat surface webhook configuration.
    pub chat: ChatSettings,

    /// Toolbox service configuration.
    #[serde(default)]
    pub toolbox: ToolboxSettings,

    /// Exchange handling configuration.
    #[serde(default)]
    pub exchange: ExchangeSettings,
}

/// Language model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// API key for the model provider.
    pub api_key: String,

    /// Model identifier.
    pub name: String,

    /// Base URL of the model provider API.
    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    /// Maximum tokens the model may generate per round.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// System prompt sent with every round.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,

    /// Per-call timeout in seconds.
    #[serde(default = "default_model_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Chat surface webhook configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// URL replies are posted to.
    pub post_url: String,

    /// URL for fetching prior thread messages. History seeding is
    /// disabled when unset.
    #[serde(default)]
    pub history_url: Option<String>,
}

/// Toolbox service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolboxSettings {
    /// Base URL of the toolbox service. The query tool is not
    /// registered when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-invocation tool timeout in seconds.
    #[serde(default = "default_tool_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Exchange handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSettings {
    /// Messages kept per conversation.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Extra tool round-trips allowed after the opening round.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Prior transcript messages fetched on first contact.
    #[serde(default = "default_history_fetch_limit")]
    pub history_fetch_limit: usize,

    /// Maximum logical lines per posted reply chunk.
    #[serde(default = "default_max_lines_per_group")]
    pub max_lines_per_group: usize,

    /// Text posted immediately on receipt. Disabled when unset.
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_model_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_model_timeout_seconds() -> u64 {
    60
}

fn default_system_prompt() -> Option<String> {
    Some(
        "You are a data assistant answering questions in a chat thread. \
         Reply concisely in plain chat formatting, without markdown tables. \
         When a question needs warehouse data, use the available tools and \
         summarize the results for the user."
            .to_string(),
    )
}

fn default_tool_timeout_seconds() -> u64 {
    30
}

fn default_history_cap() -> usize {
    20
}

fn default_max_tool_rounds() -> usize {
    1
}

fn default_history_fetch_limit() -> usize {
    10
}

fn default_max_lines_per_group() -> usize {
    10
}

impl Default for ToolboxSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_tool_timeout_seconds(),
        }
    }
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            max_tool_rounds: default_max_tool_rounds(),
            history_fetch_limit: default_history_fetch_limit(),
            max_lines_per_group: default_max_lines_per_group(),
            placeholder: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_settings_have_correct_defaults() {
        let settings = ExchangeSettings::default();
        assert_eq!(settings.history_cap, 20);
        assert_eq!(settings.max_tool_rounds, 1);
        assert_eq!(settings.history_fetch_limit, 10);
        assert_eq!(settings.max_lines_per_group, 10);
        assert!(settings.placeholder.is_none());
    }

    #[test]
    fn toolbox_defaults_to_disabled() {
        let settings = ToolboxSettings::default();
        assert!(settings.base_url.is_none());
        assert_eq!(settings.timeout_seconds, 30);
    }
}
