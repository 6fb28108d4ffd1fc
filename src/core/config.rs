//! Configuration management for Worldsmith
//!
//! Supports environment variables, config files, and runtime overrides.
//! Role prompts live here too, so a role's behaviour is data handed to it
//! at construction rather than a constant baked into the code.
//!
//! Config file location: ~/.config/worldsmith/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::prompts;
use crate::core::error::{Result, WorldsmithError};

/// Main configuration for Worldsmith
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat-completion endpoint
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Model selection and sampling
    #[serde(default)]
    pub model: ModelConfig,
    /// Per-role behaviour
    #[serde(default)]
    pub roles: RolesConfig,
    /// Routing limits and mode
    #[serde(default)]
    pub router: RouterConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Credential sent as a bearer token. Local servers ignore it.
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with every request
    pub name: String,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Whether registered tool schemas are sent to the model
    pub advertise_tools: bool,
}

/// Behaviour of each role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    pub generator: GeneratorConfig,
    pub librarian: LibrarianConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Contract that seeds a run when the caller gives no system message
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarianConfig {
    /// Contract injected ahead of the generator's output
    pub system_prompt: String,
    /// Text shown when asking for outside input
    pub input_prompt: String,
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Maximum node invocations per run
    /// Default: 32
    pub max_steps: usize,
    /// Keep asking the librarian until `/finish`
    pub follow_up: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("WORLDSMITH_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:1234/v1".to_string()),
            api_key: env::var("WORLDSMITH_API_KEY").unwrap_or_else(|_| "not-needed".to_string()),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: env::var("WORLDSMITH_MODEL")
                .unwrap_or_else(|_| "mistralai/mistral-small-3.2".to_string()),
            temperature: env::var("WORLDSMITH_TEMPERATURE")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.2),
            advertise_tools: true,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: prompts::WORLD_GENERATOR.to_string(),
        }
    }
}

impl Default for LibrarianConfig {
    fn default() -> Self {
        Self {
            system_prompt: prompts::WORLD_LIBRARIAN.to_string(),
            input_prompt: prompts::LIBRARIAN_INPUT.to_string(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_steps: 32,
            follow_up: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env::var("WORLDSMITH_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("worldsmith")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    ///
    /// A missing file means defaults; a file that exists but cannot be
    /// parsed is an error.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_or_default(&Self::config_file())
    }

    fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut config = Self::load_from_path(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit file if given, otherwise as [`Config::load`].
    /// A named file that cannot be read is an error.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let _ = dotenvy::dotenv();
                let mut config = Self::load_from_path(path)?;
                config.apply_env();
                Ok(config)
            }
            None => Self::load(),
        }
    }

    /// Let environment variables win over values read from a file
    fn apply_env(&mut self) {
        if let Ok(url) = env::var("WORLDSMITH_BASE_URL") {
            self.endpoint.base_url = url;
        }
        if let Ok(key) = env::var("WORLDSMITH_API_KEY") {
            self.endpoint.api_key = key;
        }
        if let Ok(model) = env::var("WORLDSMITH_MODEL") {
            self.model.name = model;
        }
        if let Some(temperature) = env::var("WORLDSMITH_TEMPERATURE")
            .ok()
            .and_then(|t| t.parse().ok())
        {
            self.model.temperature = temperature;
        }
        if let Ok(level) = env::var("WORLDSMITH_LOG") {
            self.logging.level = level;
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WorldsmithError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| WorldsmithError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| WorldsmithError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    WorldsmithError::config(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| WorldsmithError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| WorldsmithError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(WorldsmithError::config("endpoint.base_url is empty"));
        }
        if self.model.name.trim().is_empty() {
            return Err(WorldsmithError::config("model.name is empty"));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(WorldsmithError::config(format!(
                "model.temperature {} is outside 0.0..=2.0",
                self.model.temperature
            )));
        }
        if self.router.max_steps == 0 {
            return Err(WorldsmithError::config("router.max_steps must be at least 1"));
        }
        Ok(())
    }

    /// Full URL of the chat-completion route
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.endpoint.base_url.trim_end_matches('/')
        )
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
