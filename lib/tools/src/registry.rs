//! Tool registry.
//!
//! Tools are registered once at startup; the registry is read-only
//! afterwards. A tool is a name, a JSON-schema-described input, and an
//! executor producing the serialized result text handed back to the model.

use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use threadrelay_ai::ToolDefinition;

/// Trait for tool execution.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Returns the tool definition advertised to the model.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the given input.
    ///
    /// Returns the serialized result text on success. The serialization
    /// must be deterministic and information-preserving.
    ///
    /// # Errors
    ///
    /// Returns an error if the execution fails; the dispatcher contains
    /// it as an `is_error` tool-result block.
    async fn execute(&self, input: &JsonValue) -> Result<String, ToolError>;
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    executors: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Registers an executor under its definition's name.
    pub fn register(&mut self, executor: Arc<dyn ToolExecutor>) {
        self.executors
            .insert(executor.definition().name.clone(), executor);
    }

    /// Gets an executor by tool name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolExecutor>> {
        self.executors.get(name)
    }

    /// Returns the definitions of all registered tools.
    ///
    /// Sorted by name so the advertisement sent to the model is stable.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .executors
            .values()
            .map(|executor| executor.definition())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.executors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl ToolExecutor for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(self.name, "Echoes its input")
        }

        async fn execute(&self, input: &JsonValue) -> Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" }));

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn definitions_are_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "zeta" }));
        registry.register(Arc::new(EchoTool { name: "alpha" }));

        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
