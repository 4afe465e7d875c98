//! Messages-API wire types.
//!
//! Request and response shapes for the model endpoint. Unknown response
//! fields are ignored for forward compatibility, and unrecognized stop
//! reasons decode to [`StopReason::Other`] rather than failing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use threadrelay_conversation::{ContentBlock, Message};

/// Definition of a tool advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema for input parameters.
    pub input_schema: JsonValue,
}

impl ToolDefinition {
    /// Creates a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({}),
        }
    }

    /// Sets the input schema.
    #[must_use]
    pub fn with_input_schema(mut self, schema: JsonValue) -> Self {
        self.input_schema = schema;
        self
    }

    /// Returns the names of required input fields declared by the schema.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.input_schema
            .get("required")
            .and_then(JsonValue::as_array)
            .into_iter()
            .flatten()
            .filter_map(JsonValue::as_str)
    }
}

/// An outbound model request.
///
/// `tools` is omitted from the wire entirely when `None`; some providers
/// treat an empty list differently from an absent field, and follow-up
/// calls carrying tool results must not re-advertise definitions.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// System prompt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation turns, oldest first.
    pub messages: Vec<Message>,
    /// Tool definitions, advertised on the opening round only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model requests one or more tool invocations.
    ToolUse,
    /// The model produced its final answer.
    EndTurn,
    /// Any other or unrecognized stop reason.
    #[serde(other)]
    Other,
}

impl Default for StopReason {
    fn default() -> Self {
        Self::Other
    }
}

/// The model's structured response to one round.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundResult {
    /// Response content blocks, in order.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    #[serde(default)]
    pub stop_reason: StopReason,
    /// Model that generated the response.
    #[serde(default)]
    pub model: String,
}

impl RoundResult {
    /// Returns whether the model is asking for tool invocations.
    #[must_use]
    pub fn wants_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse
    }

    /// Extracts the plain text of the response: all `Text` blocks joined
    /// in order with newline separators. `None` if no text block is
    /// present.
    #[must_use]
    pub fn final_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }

    /// Converts the response into the assistant message appended to the
    /// working history.
    #[must_use]
    pub fn into_assistant_message(self) -> Message {
        Message::assistant_blocks(self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_field_omitted_when_absent() {
        let request = ModelRequest {
            model: "some-model".to_string(),
            max_tokens: 1024,
            system: None,
            messages: vec![Message::user_text("hi")],
            tools: None,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("tools").is_none());
        assert!(json.get("system").is_none());
    }

    #[test]
    fn tools_field_present_when_advertised() {
        let request = ModelRequest {
            model: "some-model".to_string(),
            max_tokens: 1024,
            system: Some("be brief".to_string()),
            messages: vec![Message::user_text("hi")],
            tools: Some(vec![ToolDefinition::new("lookup", "Looks things up")]),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["tools"][0]["name"], "lookup");
    }

    #[test]
    fn unknown_stop_reason_decodes_as_other() {
        let response: RoundResult = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"done"}],"stop_reason":"max_tokens","model":"m"}"#,
        )
        .expect("deserialize");
        assert_eq!(response.stop_reason, StopReason::Other);
    }

    #[test]
    fn unknown_response_fields_are_ignored() {
        let response: RoundResult = serde_json::from_str(
            r#"{"id":"msg_1","type":"message","role":"assistant","usage":{"input_tokens":3},
                "content":[{"type":"text","text":"hello"}],"stop_reason":"end_turn","model":"m"}"#,
        )
        .expect("deserialize");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.final_text(), Some("hello".to_string()));
    }

    #[test]
    fn final_text_joins_text_blocks_in_order() {
        let response = RoundResult {
            content: vec![
                ContentBlock::text("first"),
                ContentBlock::tool_use("toolu_1", "lookup", serde_json::json!({})),
                ContentBlock::text("second"),
            ],
            stop_reason: StopReason::EndTurn,
            model: String::new(),
        };
        assert_eq!(response.final_text(), Some("first\nsecond".to_string()));
    }

    #[test]
    fn final_text_none_without_text_blocks() {
        let response = RoundResult {
            content: vec![ContentBlock::tool_use("toolu_1", "lookup", serde_json::json!({}))],
            stop_reason: StopReason::ToolUse,
            model: String::new(),
        };
        assert_eq!(response.final_text(), None);
    }

    #[test]
    fn required_fields_from_schema() {
        let tool = ToolDefinition::new("q", "query").with_input_schema(serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        }));
        let required: Vec<&str> = tool.required_fields().collect();
        assert_eq!(required, vec!["query"]);
    }
}
