//! LLM Provider trait for abstracting different backends
//!
//! The role step only sees this trait, so tests and alternative endpoints
//! can stand in for the HTTP client.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolDefinition};

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send the full conversation and return exactly one assistant message.
    ///
    /// One call is one attempt; implementations must not retry. Any transport
    /// or decoding failure is reported as `ModelUnavailable`.
    async fn chat(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message>;

    /// Get the provider name
    fn name(&self) -> &str;
}
