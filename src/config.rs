//! Configuration for glitch.
//!
//! Deserialized from `config.toml` at the XDG config path
//! (`~/.config/glitch/config.toml`). Every field has a serde default so
//! glitch runs sensibly with no config file at all. The API key resolves
//! env-var-first (`OPENAI_API_KEY`, loaded from `.env` files via dotenvy at
//! startup) with the config file as fallback.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Root configuration, deserialized from `config.toml`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model identifier sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the completion endpoint. `OPENAI_API_KEY` takes
    /// precedence over this.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API (useful for proxies or
    /// OpenAI-compatible local servers).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// System prompt seeding every conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Frequency penalty.
    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,
    /// Presence penalty.
    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f32,
    /// Per-request token limit above which input is chunked.
    #[serde(default = "default_chunk_token_limit")]
    pub chunk_token_limit: usize,
    /// Token budget the conversation is trimmed to before each request.
    #[serde(default = "default_history_token_budget")]
    pub history_token_budget: usize,
    /// Retry/backoff settings for the completion call.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    crate::constants::DEFAULT_BASE_URL.to_string()
}

fn default_system_prompt() -> String {
    crate::constants::DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_temperature() -> f32 {
    crate::constants::DEFAULT_TEMPERATURE
}

fn default_frequency_penalty() -> f32 {
    crate::constants::DEFAULT_FREQUENCY_PENALTY
}

fn default_presence_penalty() -> f32 {
    crate::constants::DEFAULT_PRESENCE_PENALTY
}

fn default_chunk_token_limit() -> usize {
    crate::constants::DEFAULT_CHUNK_TOKEN_LIMIT
}

fn default_history_token_budget() -> usize {
    crate::constants::DEFAULT_HISTORY_TOKEN_BUDGET
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            frequency_penalty: default_frequency_penalty(),
            presence_penalty: default_presence_penalty(),
            chunk_token_limit: default_chunk_token_limit(),
            history_token_budget: default_history_token_budget(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Loads config from the XDG config path, falling back to defaults when
    /// no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Returns the config file path (`~/.config/glitch/config.toml`).
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base
            .join(crate::constants::APP_NAME)
            .join(crate::constants::CONFIG_FILENAME))
    }

    /// Returns the data directory (`~/.local/share/glitch/`).
    pub fn data_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().context("Could not determine data directory")?;
        Ok(base.join(crate::constants::APP_NAME))
    }

    /// Returns the cache directory (`~/.cache/glitch/`).
    pub fn cache_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir().context("Could not determine cache directory")?;
        Ok(base.join(crate::constants::APP_NAME))
    }

    /// Directory where per-conversation transcripts are written.
    pub fn transcripts_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(crate::constants::TRANSCRIPTS_DIRNAME))
    }

    /// Directory where `save_document` persists files.
    pub fn documents_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(crate::constants::DOCUMENTS_DIRNAME))
    }

    /// Resolves the API key: environment first, then the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}
