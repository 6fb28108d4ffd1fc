//! External input
//!
//! Roles that need a question from outside suspend, and the router fills the
//! gap from an [`InputSource`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::{Result, WorldsmithError};

/// Supplies one line of text on request
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Block until a line is available. No timeout.
    async fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Pre-recorded answers, handed out in order
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: Mutex<VecDeque<String>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    /// Answers not yet handed out
    pub fn remaining(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&self, _prompt: &str) -> Result<String> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| WorldsmithError::input("scripted input lock poisoned"))?;
        lines
            .pop_front()
            .ok_or_else(|| WorldsmithError::input("no scripted input left"))
    }
}
