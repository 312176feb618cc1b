//! Configuration for the mentor client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Language;

/// Environment variables consulted for the Gemini API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MentorConfig {
    /// Gemini backend configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Backend model identifiers per variant
    #[serde(default)]
    pub models: ModelTable,
    /// Knowledge-base ingestion configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Initial interface language
    #[serde(default)]
    pub language: Language,
}

impl MentorConfig {
    /// Parse a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    /// Default config file path (e.g. ~/.config/growth-mentor/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("growth-mentor").join("config.toml"))
    }

    /// Fill the API key from the environment when the file did not set one
    pub fn with_env_overrides(mut self) -> Self {
        if self.gemini.api_key().is_none() {
            self.gemini.api_key = API_KEY_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|value| !value.trim().is_empty());
        }
        self
    }
}

/// Gemini backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; blank is treated as missing
    #[serde(default)]
    pub api_key: Option<String>,
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature (backend default when unset)
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Output token limit (backend default when unset)
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl GeminiConfig {
    /// The API key, if one is configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Backend model identifier pinned for each variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelTable {
    #[serde(default = "default_deep_reasoning_model")]
    pub deep_reasoning: String,
    #[serde(default = "default_web_search_model")]
    pub web_search: String,
    #[serde(default = "default_fast_model")]
    pub fast: String,
    /// Model used to transcribe uploaded images
    #[serde(default = "default_vision_model")]
    pub vision: String,
}

fn default_deep_reasoning_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_web_search_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_fast_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_vision_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Default for ModelTable {
    fn default() -> Self {
        Self {
            deep_reasoning: default_deep_reasoning_model(),
            web_search: default_web_search_model(),
            fast: default_fast_model(),
            vision: default_vision_model(),
        }
    }
}

/// Knowledge-base ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Largest accepted file in bytes (default: 100MB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Skip files whose bytes were already ingested this session
    #[serde(default)]
    pub skip_duplicate_files: bool,
}

fn default_max_file_bytes() -> u64 {
    100 * 1024 * 1024
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            skip_duplicate_files: false,
        }
    }
}
