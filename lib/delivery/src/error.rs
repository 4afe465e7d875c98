//! Error types for chat delivery.

use std::fmt;

/// Errors from the chat surface boundary.
///
/// Delivery is best-effort: a failed post is logged, not retried, since
/// partial chunk delivery cannot be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Posting a message into the thread failed.
    PostFailed { reason: String },
    /// Fetching prior thread messages failed.
    HistoryFetchFailed { reason: String },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostFailed { reason } => {
                write!(f, "failed to post chat message: {reason}")
            }
            Self::HistoryFetchFailed { reason } => {
                write!(f, "failed to fetch thread history: {reason}")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}
