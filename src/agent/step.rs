//! Role step
//!
//! One model call, then at most one tool dispatch. Failures never escape:
//! they become in-band assistant messages and the step still reports a
//! delta the router can append.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{FailureKind, Message, Role, WorldsmithError};
use crate::llm::LLMProvider;
use crate::tools::{Dispatched, ToolRegistry};

/// Result of one role step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Model answered and any requested tool ran cleanly
    Completed { delta: Vec<Message> },
    /// Something failed; `delta` already contains the diagnostic
    Failed {
        delta: Vec<Message>,
        kind: FailureKind,
    },
}

impl StepOutcome {
    pub fn delta(&self) -> &[Message] {
        match self {
            StepOutcome::Completed { delta } | StepOutcome::Failed { delta, .. } => delta,
        }
    }

    pub fn into_delta(self) -> Vec<Message> {
        match self {
            StepOutcome::Completed { delta } | StepOutcome::Failed { delta, .. } => delta,
        }
    }

    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            StepOutcome::Completed { .. } => None,
            StepOutcome::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Shared model-then-tool flow used by every role
#[derive(Clone)]
pub struct RoleStep {
    model: Arc<dyn LLMProvider>,
    tools: Arc<ToolRegistry>,
}

impl RoleStep {
    pub fn new(model: Arc<dyn LLMProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self { model, tools }
    }

    /// Run the step over `messages` on behalf of `node`
    pub async fn run(&self, node: &str, messages: &[Message]) -> StepOutcome {
        debug!(node, messages = messages.len(), provider = self.model.name(), "calling model");

        let response = match self.model.chat(messages, self.tools.definitions()).await {
            Ok(response) if response.role() == Role::Assistant => response,
            Ok(other) => {
                let error = WorldsmithError::model_unavailable(format!(
                    "model replied with a {} message",
                    other.role()
                ));
                return Self::failed(node, Vec::new(), error);
            }
            Err(error) => return Self::failed(node, Vec::new(), error),
        };

        let call = response.first_tool_call().cloned();
        let extra_calls = response.tool_calls().len().saturating_sub(1);
        let mut delta = vec![response];

        let Some(call) = call else {
            info!(node, "model answered");
            return StepOutcome::Completed { delta };
        };

        if extra_calls > 0 {
            warn!(node, ignored = extra_calls, "only the first tool call is dispatched");
        }

        match self.tools.dispatch(&call).await {
            Ok(Dispatched::Success(message)) => {
                info!(node, tool = %call.name, call_id = %call.id, "tool answered");
                delta.push(message);
                StepOutcome::Completed { delta }
            }
            Ok(Dispatched::Failed { message, error }) => {
                delta.push(message);
                StepOutcome::Failed {
                    delta,
                    kind: error.kind(),
                }
            }
            Err(error) => {
                // Every tool call gets exactly one tool message
                delta.push(Message::tool(&call.id, format!("Error: {}", error)));
                Self::failed(node, delta, error)
            }
        }
    }

    fn failed(node: &str, mut delta: Vec<Message>, error: WorldsmithError) -> StepOutcome {
        warn!(node, %error, "step failed, continuing with diagnostic");
        let kind = error.kind();
        delta.push(diagnostic(kind, &error));
        StepOutcome::Failed { delta, kind }
    }
}

/// Human-readable assistant message describing a failure
pub fn diagnostic(kind: FailureKind, error: &WorldsmithError) -> Message {
    Message::assistant(format!("[{}] {}", kind, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Result, ToolCall, ToolDefinition};
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(std::result::Result<Message, String>);

    #[async_trait]
    impl LLMProvider for Fixed {
        async fn chat(&self, _messages: &[Message], _tools: &[ToolDefinition]) -> Result<Message> {
            self.0.clone().map_err(WorldsmithError::model_unavailable)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn step(reply: std::result::Result<Message, String>) -> RoleStep {
        RoleStep::new(
            Arc::new(Fixed(reply)),
            Arc::new(ToolRegistry::with_defaults().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let outcome = step(Ok(Message::assistant("A city of bridges.")))
            .run("generator", &[Message::human("Describe a city")])
            .await;
        assert_eq!(
            outcome,
            StepOutcome::Completed {
                delta: vec![Message::assistant("A city of bridges.")]
            }
        );
    }

    #[tokio::test]
    async fn test_model_failure_becomes_one_diagnostic() {
        let outcome = step(Err("connection refused".to_string()))
            .run("generator", &[Message::human("hi")])
            .await;
        assert_eq!(outcome.failure(), Some(FailureKind::ModelUnavailable));
        assert_eq!(outcome.delta().len(), 1);
        assert_eq!(outcome.delta()[0].role(), Role::Assistant);
        assert!(outcome.delta()[0].content().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_non_assistant_reply_is_rejected() {
        let outcome = step(Ok(Message::human("echo")))
            .run("generator", &[Message::human("hi")])
            .await;
        assert_eq!(outcome.failure(), Some(FailureKind::ModelUnavailable));
        assert_eq!(outcome.delta().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_call_is_dispatched() {
        let reply = Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "calculator", json!({"expression": "2+2"}))],
        );
        let outcome = step(Ok(reply.clone())).run("librarian", &[Message::human("sum")]).await;
        assert_eq!(
            outcome,
            StepOutcome::Completed {
                delta: vec![reply, Message::tool("c1", "4")]
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_classified() {
        let reply = Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "teleport", json!({}))],
        );
        let outcome = step(Ok(reply)).run("librarian", &[Message::human("go")]).await;
        assert_eq!(outcome.failure(), Some(FailureKind::ToolNotFound));
        let delta = outcome.delta();
        assert_eq!(delta.len(), 3);
        assert_eq!(delta[1].call_id(), Some("c1"));
        assert!(delta[1].content().starts_with("Error: Tool not found: teleport"));
        assert_eq!(delta[2].role(), Role::Assistant);
        assert!(delta[2].content().starts_with("[tool_not_found]"));
    }

    #[tokio::test]
    async fn test_only_first_call_dispatched() {
        let reply = Message::assistant_with_tools(
            "",
            vec![
                ToolCall::new("c1", "calculator", json!({"expression": "1+1"})),
                ToolCall::new("c2", "calculator", json!({"expression": "2+2"})),
            ],
        );
        let outcome = step(Ok(reply)).run("librarian", &[Message::human("x")]).await;
        let tool_messages: Vec<_> = outcome
            .delta()
            .iter()
            .filter(|m| m.role() == Role::Tool)
            .collect();
        assert_eq!(tool_messages.len(), 1);
        assert_eq!(tool_messages[0].call_id(), Some("c1"));
    }
}
