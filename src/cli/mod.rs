//! CLI module - terminal input and output
//!
//! Contains the stdin input source and the transcript printer.

pub mod input;
pub mod transcript;

pub use input::StdinInput;
pub use transcript::Transcript;
