//! Tools module - Tool implementations for the agent
//!
//! Contains the tool trait, argument schemas, the registry and the
//! built-in calculator.

pub mod calculator;
pub mod registry;
pub mod schema;

pub use calculator::CalculatorTool;
pub use registry::{Dispatched, Tool, ToolRegistry, ToolRegistryBuilder};
pub use schema::{ArgSchema, ArgSpec, ArgType};
