//! Core domain types for the threadrelay chat assistant.
//!
//! This crate provides the identifier types shared by every other crate:
//! the conversation key that groups all turns of one chat thread, and the
//! exchange correlation id attached to logs and failure notices.

pub mod id;
pub mod key;

pub use id::{ExchangeId, ParseIdError};
pub use key::ConversationKey;
