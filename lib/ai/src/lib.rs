//! Language model client for the threadrelay chat assistant.
//!
//! This crate provides:
//!
//! - **Wire types**: the Messages-API request/response shapes, including
//!   tool advertisement and the per-round structured result
//! - **`LanguageModel`**: the trait the orchestrator drives rounds through
//! - **`MessagesClient`**: the HTTP implementation over reqwest
//!
//! The client performs no retries; retry policy belongs to the caller.

pub mod client;
pub mod error;
pub mod wire;

pub use client::{LanguageModel, MessagesClient, ModelConfig};
pub use error::LlmError;
pub use wire::{ModelRequest, RoundResult, StopReason, ToolDefinition};
