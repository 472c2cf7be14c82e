//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file. They are
//! deserialized directly and then resolved once into the application's
//! [`GenerationConfig`], which is what travels down the call chain.

use serde::{Deserialize, Serialize};
use sermonsmith_application::config::{Environment, GenerationConfig, PollSettings};
use sermonsmith_domain::RoutePreference;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Generation pipeline settings
    pub generation: FileGenerationConfig,
    /// Provider connection settings
    pub provider: FileProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Force the conversational-assistant path for every request.
    pub force_primary: bool,
    /// Force the single-shot path for every request.
    pub force_secondary: bool,
    /// "production" or "development"; only affects the unforced default.
    pub environment: String,
    /// Provider-side assistant id; a documented constant applies when unset.
    pub assistant_id: Option<String>,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
    /// Model used on the single-shot path.
    pub completion_model: Option<String>,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            force_primary: false,
            force_secondary: false,
            environment: "production".to_string(),
            assistant_id: None,
            poll_interval_ms: 1000,
            poll_max_attempts: 60,
            completion_model: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Provider API key; `OPENAI_API_KEY` is the fallback when unset.
    pub api_key: Option<String>,
    /// Base URL override for OpenAI-compatible deployments.
    pub base_url: Option<String>,
}

impl FileConfig {
    /// Resolve the raw file values into the application configuration.
    pub fn resolve(&self) -> Result<GenerationConfig, ConfigError> {
        let environment: Environment = self
            .generation
            .environment
            .parse()
            .map_err(ConfigError::Invalid)?;
        if self.generation.poll_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "poll_max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(GenerationConfig {
            route: RoutePreference {
                force_primary: self.generation.force_primary,
                force_secondary: self.generation.force_secondary,
            },
            environment,
            assistant_id: self.generation.assistant_id.clone(),
            poll: PollSettings {
                interval: Duration::from_millis(self.generation.poll_interval_ms),
                max_attempts: self.generation.poll_max_attempts,
            },
            completion_model: self.generation.completion_model.clone(),
        })
    }

    /// The API key to use, applying the environment fallback.
    pub fn api_key(&self) -> Option<String> {
        self.provider
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}
