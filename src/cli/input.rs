//! Terminal input for the librarian

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::agent::InputSource;
use crate::core::{Result, WorldsmithError};

/// Reads one line from stdin per request
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinInput;

#[async_trait]
impl InputSource for StdinInput {
    async fn read_line(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.to_string();

        // Blocking read off the runtime threads
        tokio::task::spawn_blocking(move || -> Result<String> {
            let mut stdout = io::stdout();
            write!(stdout, "\n{}", prompt)?;
            stdout.flush()?;

            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                return Err(WorldsmithError::input("stdin closed"));
            }
            Ok(line.trim_end_matches(['\r', '\n']).to_string())
        })
        .await
        .map_err(|e| WorldsmithError::input(format!("input task failed: {}", e)))?
    }
}
