//! OpenAI-compatible chat-completion client
//!
//! Talks to any server exposing `POST {base_url}/chat/completions`
//! (LM Studio, llama.cpp server, vLLM, hosted OpenAI). Non-streaming only.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::{Config, Message, Result, ToolCall, ToolDefinition, WorldsmithError};
use crate::llm::traits::LLMProvider;

/// Client for an OpenAI-compatible endpoint
#[derive(Clone)]
pub struct OpenAICompatClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    advertise_tools: bool,
}

/// Chat-completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
}

/// Message in the wire format
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// Tool call in the wire format
#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunction,
}

/// Function inside a tool call.
///
/// `arguments` is a JSON-encoded string per the OpenAI format, but some local
/// servers send a plain object, so both are accepted on the way in.
#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

fn function_type() -> String {
    "function".to_string()
}

/// Chat-completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

impl OpenAICompatClient {
    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.endpoint.timeout_secs))
            .build()
            .map_err(|e| WorldsmithError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.chat_completions_url(),
            api_key: config.endpoint.api_key.clone(),
            model: config.model.name.clone(),
            temperature: config.model.temperature,
            advertise_tools: config.model.advertise_tools,
        })
    }

    /// Create a client for a base URL with default settings otherwise
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let mut config = Config::default();
        config.endpoint.base_url = base_url.into();
        config.model.name = model.into();
        Self::from_config(&config)
    }

    /// The model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert internal Message to wire format
    fn to_wire_message(msg: &Message) -> WireMessage {
        match msg {
            Message::System { content } => WireMessage {
                role: "system".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Human { content } => WireMessage {
                role: "user".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Assistant {
                content,
                tool_calls,
            } => WireMessage {
                role: "assistant".to_string(),
                content: Some(content.clone()),
                tool_calls: if tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        tool_calls
                            .iter()
                            .map(|tc| WireToolCall {
                                id: Some(tc.id.clone()),
                                kind: function_type(),
                                function: WireFunction {
                                    name: tc.name.clone(),
                                    arguments: serde_json::Value::String(
                                        tc.arguments.to_string(),
                                    ),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: None,
            },
            Message::Tool { content, call_id } => WireMessage {
                role: "tool".to_string(),
                content: Some(content.clone()),
                tool_calls: None,
                tool_call_id: Some(call_id.clone()),
            },
        }
    }

    /// Convert a wire tool call, decoding string-encoded arguments
    fn to_tool_call(wire: WireToolCall) -> Result<ToolCall> {
        let arguments = match wire.function.arguments {
            serde_json::Value::String(raw) if raw.trim().is_empty() => serde_json::json!({}),
            serde_json::Value::String(raw) => serde_json::from_str(&raw).map_err(|e| {
                WorldsmithError::model_unavailable(format!(
                    "Malformed arguments for tool '{}': {}",
                    wire.function.name, e
                ))
            })?,
            serde_json::Value::Null => serde_json::json!({}),
            other => other,
        };

        if !arguments.is_object() {
            return Err(WorldsmithError::model_unavailable(format!(
                "Arguments for tool '{}' are not an object",
                wire.function.name
            )));
        }

        let id = wire
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));

        Ok(ToolCall::new(id, wire.function.name, arguments))
    }

    /// Convert the response body to an assistant message
    fn to_message(response: ChatResponse) -> Result<Message> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| WorldsmithError::model_unavailable("Response has no choices"))?;

        let wire = choice.message;
        if !wire.role.is_empty() && wire.role != "assistant" {
            return Err(WorldsmithError::model_unavailable(format!(
                "Expected an assistant message, got role '{}'",
                wire.role
            )));
        }

        let tool_calls = wire
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(Self::to_tool_call)
            .collect::<Result<Vec<_>>>()?;

        let content = wire.content.unwrap_or_default();
        if content.is_empty() && tool_calls.is_empty() {
            return Err(WorldsmithError::model_unavailable(
                "Response has neither content nor tool calls",
            ));
        }

        Ok(Message::assistant_with_tools(content, tool_calls))
    }
}

/// Shorten long payloads for debug logs
fn preview(text: &str) -> String {
    const LIMIT: usize = 500;
    if text.chars().count() > LIMIT {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatClient {
    async fn chat(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message> {
        if messages.is_empty() {
            return Err(WorldsmithError::model_unavailable(
                "Refusing to call the model with an empty conversation",
            ));
        }

        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(Self::to_wire_message).collect(),
            temperature: self.temperature,
            tools: if self.advertise_tools && !tools.is_empty() {
                Some(tools)
            } else {
                None
            },
        };

        let request_json = serde_json::to_string(&request)?;
        debug!(url = %self.url, body = %preview(&request_json), "chat request");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WorldsmithError::model_unavailable(format!(
                        "Cannot connect to model endpoint at {}. Is it running?",
                        self.url
                    ))
                } else if e.is_timeout() {
                    WorldsmithError::model_unavailable(format!(
                        "Request to {} timed out",
                        self.url
                    ))
                } else {
                    WorldsmithError::model_unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(WorldsmithError::model_unavailable(format!(
                "Endpoint error ({}): {}",
                status,
                preview(&error_text)
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| WorldsmithError::model_unavailable(format!("Failed to read body: {}", e)))?;
        debug!(body = %preview(&response_text), "chat response");

        let chat_response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            WorldsmithError::model_unavailable(format!("Failed to parse response: {}", e))
        })?;

        Self::to_message(chat_response)
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
