//! Exchange orchestration for the threadrelay chat assistant.
//!
//! One inbound chat event drives one exchange: load conversation history,
//! call the model, dispatch any requested tool batch, feed results back
//! for a follow-up round, then commit history and deliver the reply in
//! chunks. The orchestrator is the only component that sequences these
//! steps and the only writer of conversation history.

pub mod error;
pub mod orchestrator;

pub use error::ExchangeError;
pub use orchestrator::{ExchangeConfig, Orchestrator};
