//! Error types for the Scriptor transcription pipeline.
//!
//! Errors are organized by stage so that the message printed when a run
//! aborts names the file and the step that failed.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Scriptor operations.
#[derive(Error, Debug)]
pub enum ScriptorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required credential is not present in the environment
    #[error("{provider} API key not set. Set the {variable} environment variable (or add it to .env).")]
    MissingCredential { provider: String, variable: String },
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input directory does not exist
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    /// Walking the input directory failed (unreadable entry, dangling link, loop)
    #[error("Cannot read {path} while scanning input: {message}")]
    Discovery { path: PathBuf, message: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// Inference call failed or returned an unusable response
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },

    /// Writing a transcript failed
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Clearing the output directory failed
    #[error("Failed to clear output directory {path}: {source}")]
    Clear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Scriptor results.
pub type Result<T> = std::result::Result<T, ScriptorError>;
