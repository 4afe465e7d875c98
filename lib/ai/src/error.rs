//! Error types for language model calls.

use std::fmt;

/// Errors from one model round-trip.
///
/// None of these are retried by the client itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network-level failure: the provider was unreachable or the
    /// connection dropped mid-call.
    Transport { reason: String },
    /// The provider answered with a non-success status code.
    Provider { status: u16, body: String },
    /// The response body could not be decoded into a round result.
    Decode { reason: String },
    /// The call exceeded its configured timeout.
    Timeout,
    /// The client configuration is unusable.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => {
                write!(f, "model call transport failure: {reason}")
            }
            Self::Provider { status, body } => {
                write!(f, "model provider error: status {status} - {body}")
            }
            Self::Decode { reason } => {
                write!(f, "failed to decode model response: {reason}")
            }
            Self::Timeout => write!(f, "model call timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid model client configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}
