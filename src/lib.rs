//! Worldsmith - Two-Role World-Building Agent
//!
//! A generator drafts a world as canon, then a librarian answers questions
//! against it. Both roles talk to an OpenAI-compatible chat endpoint (LM
//! Studio by default) and may call registered tools.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, error handling and logging
//! - **LLM**: Chat-completion provider abstraction with an OpenAI-compatible client
//! - **Tools**: Tool registry, argument schemas and the calculator
//! - **Agent**: Conversation state, role steps, role nodes and the router
//! - **CLI**: Terminal input and transcript output
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use worldsmith::agent::{build_router, seed_messages, ScriptedInput};
//! use worldsmith::llm::OpenAICompatClient;
//! use worldsmith::tools::ToolRegistry;
//! use worldsmith::Config;
//!
//! #[tokio::main]
//! async fn main() -> worldsmith::Result<()> {
//!     let config = Config::load()?;
//!     let model = Arc::new(OpenAICompatClient::from_config(&config)?);
//!     let tools = Arc::new(ToolRegistry::with_defaults()?);
//!     let router = build_router(&config, model, tools)?;
//!
//!     let input = ScriptedInput::new(["Who rules the northern coast?"]);
//!     let state = router
//!         .run(seed_messages(&config, "A drowned archipelago"), &input)
//!         .await?;
//!     println!("{}", state.last().map(|m| m.content()).unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{ConversationState, Router, RunReport};
pub use core::{Config, FailureKind, Result, WorldsmithError};
