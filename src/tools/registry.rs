//! Tool registry - manages and dispatches tool calls
//!
//! Built once at startup, then frozen. Tool names arriving from the model
//! are untrusted and go through a plain map lookup with an explicit
//! not-found error.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::{Message, Result, ToolCall, ToolDefinition, WorldsmithError};
use crate::tools::schema::ArgSchema;

/// A capability the model may invoke by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique registry key
    fn name(&self) -> &str;

    /// What the tool does, shown to the model
    fn description(&self) -> &str;

    /// Accepted arguments
    fn schema(&self) -> ArgSchema;

    /// Run the tool. Arguments have already passed `schema().validate`.
    async fn invoke(&self, call: &ToolCall) -> Result<String>;
}

/// Outcome of dispatching one call. Both arms carry the single tool message
/// answering the call.
#[derive(Debug)]
pub enum Dispatched {
    Success(Message),
    Failed { message: Message, error: WorldsmithError },
}

impl Dispatched {
    pub fn message(&self) -> &Message {
        match self {
            Dispatched::Success(message) | Dispatched::Failed { message, .. } => message,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Dispatched::Success(message) | Dispatched::Failed { message, .. } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Dispatched::Success(_))
    }
}

/// Registry of available tools
pub struct ToolRegistry {
    /// Tools indexed by name
    tools: BTreeMap<String, Arc<dyn Tool>>,
    /// Definitions advertised to the model, sorted by name
    definitions: Vec<ToolDefinition>,
}

/// Collects tools before the registry is frozen
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Register a tool. Names must be unique.
    pub fn register(mut self, tool: impl Tool + 'static) -> Result<Self> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(WorldsmithError::config("Tool name must not be empty"));
        }
        if self.tools.contains_key(&name) {
            return Err(WorldsmithError::config(format!(
                "Tool '{}' is registered twice",
                name
            )));
        }
        self.tools.insert(name, Arc::new(tool));
        Ok(self)
    }

    /// Freeze the registry
    pub fn build(self) -> ToolRegistry {
        let definitions = self
            .tools
            .values()
            .map(|tool| {
                ToolDefinition::function(
                    tool.name(),
                    tool.description(),
                    tool.schema().to_json_schema(),
                )
            })
            .collect();

        ToolRegistry {
            tools: self.tools,
            definitions,
        }
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// A registry with no tools
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// A registry with the built-in tools
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::builder()
            .register(crate::tools::calculator::CalculatorTool::new())?
            .build())
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call.
    ///
    /// An unknown name is the only error. Invalid arguments and tool failures
    /// come back as a tool message describing the problem, with the same call
    /// id as the request.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<Dispatched> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| WorldsmithError::tool_not_found(&call.name))?;

        debug!(tool = %call.name, call_id = %call.id, "dispatching tool");

        let outcome = match tool.schema().validate(&call.arguments) {
            Err(reason) => Err(WorldsmithError::tool(&call.name, reason)),
            Ok(()) => tool.invoke(call).await.map_err(|e| match e {
                err @ WorldsmithError::ToolExecution { .. } => err,
                other => WorldsmithError::tool(&call.name, other.to_string()),
            }),
        };

        Ok(match outcome {
            Ok(output) => Dispatched::Success(Message::tool(&call.id, output)),
            Err(error) => {
                warn!(tool = %call.name, call_id = %call.id, %error, "tool failed");
                Dispatched::Failed {
                    message: Message::tool(&call.id, format!("Error: {}", error)),
                    error,
                }
            }
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FailureKind;
    use crate::tools::schema::ArgType;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Repeat the text"
        }

        fn schema(&self) -> ArgSchema {
            ArgSchema::new().required("text", ArgType::String, "Text to repeat")
        }

        async fn invoke(&self, call: &ToolCall) -> Result<String> {
            Ok(call.get_string("text").unwrap_or_default())
        }
    }

    struct Broken;

    #[async_trait]
    impl Tool for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn schema(&self) -> ArgSchema {
            ArgSchema::new()
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<String> {
            Err(WorldsmithError::Other("disk on fire".to_string()))
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::builder()
            .register(Echo)
            .unwrap()
            .register(Broken)
            .unwrap()
            .build()
    }

    #[test]
    fn test_duplicate_registration_is_config_error() {
        let err = ToolRegistry::builder()
            .register(Echo)
            .unwrap()
            .register(Echo)
            .err()
            .unwrap();
        assert_eq!(err.kind(), FailureKind::Configuration);
    }

    #[test]
    fn test_definitions_are_sorted() {
        let registry = registry();
        let names: Vec<_> = registry
            .definitions()
            .iter()
            .map(|d| d.function.name.as_str())
            .collect();
        assert_eq!(names, vec!["broken", "echo"]);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_echoes_call_id() {
        let call = ToolCall::new("c7", "echo", json!({"text": "hello"}));
        let result = registry().dispatch(&call).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.into_message(), Message::tool("c7", "hello"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let call = ToolCall::new("c1", "summon_dragon", json!({}));
        let err = registry().dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ToolNotFound);
    }

    #[tokio::test]
    async fn test_failing_tool_yields_tool_message() {
        let call = ToolCall::new("c2", "broken", json!({}));
        let result = registry().dispatch(&call).await.unwrap();
        match result {
            Dispatched::Failed { message, error } => {
                assert_eq!(error.kind(), FailureKind::ToolExecution);
                assert_eq!(message.call_id(), Some("c2"));
                assert!(message.content().contains("disk on fire"));
            }
            Dispatched::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_tool() {
        let call = ToolCall::new("c3", "echo", json!({"text": 12}));
        let result = registry().dispatch(&call).await.unwrap();
        assert!(!result.is_success());
        assert!(result.message().content().contains("must be a string"));
    }
}
