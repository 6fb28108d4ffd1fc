//! Core module - shared infrastructure for Worldsmith
//!
//! This module contains foundational types, configuration, logging setup and
//! error handling used throughout the crate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::Config;
pub use error::{FailureKind, Result, WorldsmithError};
pub use types::*;
