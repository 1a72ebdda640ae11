//! Sub-configuration structs with defaults matching the original batch script.

use serde::{Deserialize, Serialize};

/// Default transcription prompt for the 1918 Fraktur corpus.
pub const DEFAULT_PROMPT: &str = "Transkribiere mir den Text auf diesem Bild. \
    Der Text ist in Fraktur geschrieben. \
    Es handelt sich um einen Text von 1918, es geht um die Vorarlberger Frage. \
    Gebe mir den Text Wort für Wort wieder.";

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for images
    pub input_dir: String,

    /// Directory receiving one `.txt` per image (cleared at the start of each run)
    pub output_dir: String,

    /// File extension selecting images, without the dot
    pub extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: "../image_data".to_string(),
            output_dir: "../answers/google".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

/// Prompt and sampling settings sent with every image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Instruction sent alongside each image
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional cap on generated tokens. Unset lets the provider decide,
    /// except for Anthropic which requires a value (falls back to 4096).
    pub max_output_tokens: Option<u32>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: 0.5,
            max_output_tokens: None,
        }
    }
}

/// Per-million-token prices used for the cost summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// USD per one million input tokens
    pub input_per_million_usd: f64,

    /// USD per one million output tokens
    pub output_per_million_usd: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_per_million_usd: 2.5,
            output_per_million_usd: 10.0,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes (inline image uploads are capped by providers)
    pub max_file_size_mb: u64,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Optional per-request timeout for the inference call. Unset means a
    /// hung request blocks the run.
    pub request_timeout_ms: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            decode_timeout_ms: 5000,
            request_timeout_ms: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// LLM provider selection and per-provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used when none is given on the command line
    pub provider: String,

    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: Some(GeminiConfig::default()),
            openai: None,
            anthropic: None,
        }
    }
}

/// Google Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base endpoint (model path and `:generateContent` are appended)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat Completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// Messages API endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}
