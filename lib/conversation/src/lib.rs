//! Conversation model for the threadrelay chat assistant.
//!
//! This crate provides:
//!
//! - **Message model**: roles, content blocks, and the plain-text shorthand
//!   accepted on the opening user turn
//! - **History store**: in-memory, per-conversation message sequences with
//!   per-key serialization and a recency cap

pub mod history;
pub mod message;

pub use history::{HistoryGuard, HistoryStore};
pub use message::{ContentBlock, Message, MessageContent, Role};
