//! Concurrent tool dispatch.
//!
//! One batch per model response: every requested tool-use in the response
//! is executed concurrently, and the batch result preserves request order
//! and count. A failing invocation never aborts its siblings; it is folded
//! into an `is_error` tool-result block so the model can recover or
//! explain.

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use futures::future::join_all;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use threadrelay_ai::ToolDefinition;
use threadrelay_conversation::ContentBlock;

/// One requested tool invocation, extracted from a model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUse {
    /// Correlation id echoed back in the result block.
    pub id: String,
    /// Requested tool name.
    pub name: String,
    /// Tool input object.
    pub input: JsonValue,
}

impl ToolUse {
    /// Collects all tool-use blocks from a response's content, in order.
    #[must_use]
    pub fn collect(blocks: &[ContentBlock]) -> Vec<Self> {
        blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(Self {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Executes batches of requested tool invocations.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    invocation_timeout: Duration,
}

impl ToolDispatcher {
    /// Creates a dispatcher over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, invocation_timeout: Duration) -> Self {
        Self {
            registry,
            invocation_timeout,
        }
    }

    /// Returns the definitions to advertise on an opening model call.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// Executes a batch of tool-uses and returns one tool-result block per
    /// request, in the same order, with matching correlation ids.
    ///
    /// Unknown names and schema-validation failures are answered without
    /// invoking anything; everything else runs concurrently and to
    /// completion.
    pub async fn dispatch(&self, requests: &[ToolUse]) -> Vec<ContentBlock> {
        tracing::info!(batch_size = requests.len(), "dispatching tool batch");
        let invocations = requests.iter().map(|request| self.run_one(request));
        join_all(invocations).await
    }

    async fn run_one(&self, request: &ToolUse) -> ContentBlock {
        match self.invoke(request).await {
            Ok(content) => ContentBlock::tool_result(&request.id, content),
            Err(error) => {
                tracing::warn!(
                    tool = %request.name,
                    tool_use_id = %request.id,
                    %error,
                    "tool invocation contained as error result"
                );
                ContentBlock::tool_error(&request.id, error.to_string())
            }
        }
    }

    async fn invoke(&self, request: &ToolUse) -> Result<String, ToolError> {
        let executor = self
            .registry
            .get(&request.name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: request.name.clone(),
            })?;

        validate_input(&executor.definition(), &request.input)?;

        tokio::time::timeout(self.invocation_timeout, executor.execute(&request.input))
            .await
            .map_err(|_| ToolError::Timeout {
                name: request.name.clone(),
            })?
    }
}

/// Checks the input against the schema's `required` list.
///
/// A required field that is absent, JSON null, or a blank string is
/// rejected before the executor runs.
fn validate_input(definition: &ToolDefinition, input: &JsonValue) -> Result<(), ToolError> {
    for field in definition.required_fields() {
        let value = input.get(field);
        let blank = match value {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if blank {
            return Err(ToolError::InvalidInput {
                name: definition.name.clone(),
                reason: format!("missing or blank required field '{field}'"),
            });
        }
    }
    Ok(())
}
