//! Error types for tool execution.

use std::fmt;

/// Errors from tool lookup, validation, and execution.
///
/// All of these are contained at the dispatcher boundary: they become
/// `is_error` tool-result blocks fed back to the model, never
/// exchange-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The model requested a tool name with no registered executor.
    UnknownTool { name: String },
    /// The tool input is missing or blank on a schema-required field.
    InvalidInput { name: String, reason: String },
    /// The executor's backend was unreachable.
    Transport { name: String, reason: String },
    /// The executor failed.
    ExecutionFailed { name: String, reason: String },
    /// The invocation exceeded its configured timeout.
    Timeout { name: String },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool { .. } => {
                write!(f, "Tool not recognized or supported.")
            }
            Self::InvalidInput { name, reason } => {
                write!(f, "invalid input for tool '{name}': {reason}")
            }
            Self::Transport { name, reason } => {
                write!(f, "tool '{name}' backend unreachable: {reason}")
            }
            Self::ExecutionFailed { name, reason } => {
                write!(f, "tool '{name}' execution failed: {reason}")
            }
            Self::Timeout { name } => {
                write!(f, "tool '{name}' invocation timed out")
            }
        }
    }
}

impl std::error::Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_uses_fixed_wording() {
        let err = ToolError::UnknownTool {
            name: "does_not_exist".to_string(),
        };
        assert_eq!(err.to_string(), "Tool not recognized or supported.");
    }

    #[test]
    fn invalid_input_display() {
        let err = ToolError::InvalidInput {
            name: "executeQueryOnBigQuery".to_string(),
            reason: "missing or blank required field 'query'".to_string(),
        };
        assert!(err.to_string().contains("query"));
    }
}
