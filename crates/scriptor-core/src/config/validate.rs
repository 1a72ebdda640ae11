//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.extension must not be empty".into(),
            ));
        }
        if self.transcription.prompt.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "transcription.prompt must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.transcription.temperature) {
            return Err(ConfigError::ValidationError(
                "transcription.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.transcription.max_output_tokens == Some(0) {
            return Err(ConfigError::ValidationError(
                "transcription.max_output_tokens must be > 0".into(),
            ));
        }
        if self.pricing.input_per_million_usd < 0.0 || self.pricing.output_per_million_usd < 0.0 {
            return Err(ConfigError::ValidationError(
                "pricing rates must not be negative".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
