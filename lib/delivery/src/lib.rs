//! Chat delivery for the threadrelay chat assistant.
//!
//! This crate provides:
//!
//! - **`ChatTransport`**: the boundary to the rate-limited chat surface
//!   (posting replies, fetching prior thread messages)
//! - **Reply chunking**: regrouping model output into a bounded number of
//!   readable messages instead of one blob or one message per line

pub mod adapter;
pub mod chunk;
pub mod error;
pub mod mention;

pub use adapter::{ChatTransport, TranscriptEntry};
pub use chunk::{StreamChunker, chunk};
pub use error::DeliveryError;
pub use mention::strip_mention;
