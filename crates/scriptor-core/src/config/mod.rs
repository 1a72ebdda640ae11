//! Configuration management for Scriptor.
//!
//! Configuration is loaded from the platform config directory with defaults
//! equal to the constants the batch script was originally run with.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Scriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// Prompt and sampling settings
    pub transcription: TranscriptionConfig,

    /// Token pricing for the cost summary
    pub pricing: PricingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.scriptor.scriptor/config.toml
    /// - Linux: ~/.config/scriptor/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\scriptor\config\config.toml
    ///
    /// Falls back to ~/.scriptor/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "scriptor", "scriptor")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".scriptor").join("config.toml")
            })
    }

    /// Resolved input directory (with ~ expansion).
    pub fn input_dir(&self) -> PathBuf {
        expand(&self.paths.input_dir)
    }

    /// Resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        expand(&self.paths.output_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
