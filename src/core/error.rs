//! Error types for Worldsmith
//!
//! One error enum for the whole crate. Model, tool and input failures are
//! recoverable and get turned into in-band messages by the role step;
//! configuration errors are fatal and surface before a run starts.

use std::fmt;

use thiserror::Error;

/// Main error type for Worldsmith operations
#[derive(Error, Debug)]
pub enum WorldsmithError {
    /// Endpoint unreachable, non-success status, or a malformed response
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model asked for a tool that is not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A registered tool failed while running
    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// Invalid routing graph or settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The external input collaborator closed or failed
    #[error("Input error: {0}")]
    Input(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Worldsmith operations
pub type Result<T> = std::result::Result<T, WorldsmithError>;

/// Coarse classification of a failure, carried alongside in-band diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ModelUnavailable,
    ToolNotFound,
    ToolExecution,
    Configuration,
    Input,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::ModelUnavailable => "model_unavailable",
            FailureKind::ToolNotFound => "tool_not_found",
            FailureKind::ToolExecution => "tool_execution",
            FailureKind::Configuration => "configuration",
            FailureKind::Input => "input",
            FailureKind::Other => "other",
        };
        f.write_str(label)
    }
}

impl WorldsmithError {
    /// Create a model-unavailable error
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a tool-not-found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create a tool execution error
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Classify this error.
    ///
    /// Transport-level failures (`Http`, `Json`) only arise from talking to
    /// the model endpoint, so they count as the model being unavailable.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ModelUnavailable(_) | Self::Http(_) | Self::Json(_) => {
                FailureKind::ModelUnavailable
            }
            Self::ToolNotFound(_) => FailureKind::ToolNotFound,
            Self::ToolExecution { .. } => FailureKind::ToolExecution,
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Input(_) => FailureKind::Input,
            Self::Io(_) | Self::Other(_) => FailureKind::Other,
        }
    }

    /// Whether this error must abort before a run starts
    pub fn is_fatal(&self) -> bool {
        self.kind() == FailureKind::Configuration
    }
}
