//! Error types for exchange orchestration.

use std::fmt;
use threadrelay_ai::LlmError;

/// Terminal failure of one exchange.
///
/// Tool-level failures never surface here; they are contained as error
/// tool-results inside the round. Only a failed model call aborts an
/// exchange, and an aborted exchange leaves history untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// A model round-trip failed.
    Model(LlmError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(source) => write!(f, "exchange aborted: {source}"),
        }
    }
}

impl std::error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(source) => Some(source),
        }
    }
}

impl From<LlmError> for ExchangeError {
    fn from(source: LlmError) -> Self {
        Self::Model(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_cause() {
        let err = ExchangeError::Model(LlmError::Timeout);
        assert!(err.to_string().contains("timed out"));
    }
}
