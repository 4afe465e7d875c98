//! Message types for conversations.
//!
//! The content-block union is a closed sum type: a block is exactly one of
//! text, tool-use, or tool-result, with no invalid field combinations
//! representable. Serialization follows the Messages-API wire shape
//! (`type` tag, snake_case variant names).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The role of a message sender.
///
/// Roles are fixed; the wire protocol defines no others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User/human message, including tool-result carrier messages.
    User,
    /// Assistant/model message.
    Assistant,
}

/// One content block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text produced by the model or fed to it.
    Text {
        /// The text content.
        text: String,
    },
    /// A model-initiated request to invoke a tool.
    ToolUse {
        /// Correlation id, unique within a single model response.
        id: String,
        /// Name of the requested tool.
        name: String,
        /// Tool input, a JSON object matching the tool's declared schema.
        input: JsonValue,
    },
    /// The outcome of executing a requested tool-use.
    ToolResult {
        /// Echoes the `id` of the tool-use this result answers.
        tool_use_id: String,
        /// Serialized result text handed back to the model.
        content: String,
        /// Whether the invocation failed.
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    /// Creates a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a tool-use block.
    #[must_use]
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: JsonValue) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Creates a successful tool-result block.
    #[must_use]
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates a failed tool-result block.
    #[must_use]
    pub fn tool_error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// Message content: either the plain-text shorthand or a list of blocks.
///
/// The shorthand form is only valid for the opening user turn of a round;
/// assistant messages and tool-result carrier messages use the block form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain-text shorthand.
    Text(String),
    /// List-of-blocks form.
    Blocks(Vec<ContentBlock>),
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: Role,
    /// Message content.
    pub content: MessageContent,
}

impl Message {
    /// Creates a user message in the plain-text shorthand form.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Creates an assistant message in the plain-text shorthand form.
    ///
    /// Used when seeding history from a prior channel transcript, where
    /// only the posted text survives.
    #[must_use]
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Creates an assistant message from the model's content blocks.
    #[must_use]
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Creates the user message carrying a batch of tool results.
    #[must_use]
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(results),
        }
    }

    /// Returns the tool-use blocks of this message, in order.
    pub fn tool_uses(&self) -> impl Iterator<Item = &ContentBlock> {
        let blocks = match &self.content {
            MessageContent::Blocks(blocks) => blocks.as_slice(),
            MessageContent::Text(_) => &[],
        };
        blocks
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_text_shorthand_serializes_as_string() {
        let msg = Message::user_text("What were sales last week?");
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "What were sales last week?");
    }

    #[test]
    fn assistant_blocks_serialize_tagged() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::text("Let me check."),
            ContentBlock::tool_use("toolu_1", "executeQueryOnBigQuery", serde_json::json!({"query": "SELECT 1"})),
        ]);
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "tool_use");
        assert_eq!(json["content"][1]["name"], "executeQueryOnBigQuery");
    }

    #[test]
    fn tool_result_block_wire_shape() {
        let block = ContentBlock::tool_error("toolu_9", "Tool not recognized or supported.");
        let json = serde_json::to_value(&block).expect("serialize");
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "toolu_9");
        assert_eq!(json["is_error"], true);
    }

    #[test]
    fn content_deserializes_both_forms() {
        let text: Message =
            serde_json::from_str(r#"{"role":"user","content":"hi"}"#).expect("deserialize");
        assert_eq!(text.content, MessageContent::Text("hi".to_string()));

        let blocks: Message = serde_json::from_str(
            r#"{"role":"assistant","content":[{"type":"text","text":"hello"}]}"#,
        )
        .expect("deserialize");
        assert_eq!(
            blocks.content,
            MessageContent::Blocks(vec![ContentBlock::text("hello")])
        );
    }

    #[test]
    fn is_error_defaults_to_false() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"tool_result","tool_use_id":"t1","content":"ok"}"#)
                .expect("deserialize");
        assert_eq!(block, ContentBlock::tool_result("t1", "ok"));
    }

    #[test]
    fn tool_uses_filters_blocks() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::text("Running two queries."),
            ContentBlock::tool_use("toolu_1", "a", serde_json::json!({})),
            ContentBlock::tool_use("toolu_2", "b", serde_json::json!({})),
        ]);
        assert_eq!(msg.tool_uses().count(), 2);

        let plain = Message::user_text("hi");
        assert_eq!(plain.tool_uses().count(), 0);
    }
}
