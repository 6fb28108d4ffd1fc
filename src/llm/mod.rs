//! LLM module - Language Model integrations
//!
//! The model caller: one trait and an OpenAI-compatible HTTP implementation.

pub mod openai;
pub mod traits;

pub use openai::OpenAICompatClient;
pub use traits::LLMProvider;
