//! LLM provider trait and request/response types.
//!
//! Defines the interface every inference backend implements, plus the
//! factory that builds the configured provider and resolves its credential.

use crate::config::{LlmConfig, TranscriptionConfig};
use crate::error::{ConfigError, PipelineError};
use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// One image plus the instruction to transcribe it.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// The page to transcribe
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate, if capped
    pub max_output_tokens: Option<u32>,
}

impl TranscriptionRequest {
    /// Build a request for `image` using the configured prompt and sampling settings.
    pub fn new(image: ImageInput, config: &TranscriptionConfig) -> Self {
        Self {
            image,
            prompt: config.prompt.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// The response from a transcription call.
#[derive(Debug, Clone)]
pub struct TranscriptionResponse {
    /// Generated text, exactly as returned
    pub text: String,
    /// Prompt tokens billed (image + instruction)
    pub input_tokens: u64,
    /// Generated tokens billed
    pub output_tokens: u64,
    /// Model identifier used
    pub model: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Model the provider sends requests to.
    fn model(&self) -> &str;

    /// Transcribe the image in `request`.
    async fn generate(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResponse, PipelineError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Unset and empty variables both resolve to `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve a provider API key, naming the missing variable on failure.
fn resolve_api_key(provider: &str, value: &str, default_var: &str) -> Result<String, ConfigError> {
    resolve_env_var(value).ok_or_else(|| {
        let variable = value
            .strip_prefix("${")
            .and_then(|v| v.strip_suffix('}'))
            .unwrap_or(default_var);
        ConfigError::MissingCredential {
            provider: provider.to_string(),
            variable: variable.to_string(),
        }
    })
}

/// POST a JSON body and decode the JSON reply, mapping every failure to
/// `PipelineError::Llm` with the provider label and HTTP status.
pub(crate) async fn post_json<B, R>(
    label: &str,
    request: reqwest::RequestBuilder,
    body: &B,
    timeout: Option<Duration>,
) -> Result<R, PipelineError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let request = match timeout {
        Some(t) => request.timeout(t),
        None => request,
    };

    let resp = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| PipelineError::Llm {
            message: if e.is_timeout() {
                format!("{label} request timed out: {e}")
            } else {
                format!("{label} request failed: {e}")
            },
            status_code: None,
        })?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(PipelineError::Llm {
            message: format!("{label} HTTP {status}: {text}"),
            status_code: Some(status.as_u16()),
        });
    }

    resp.json().await.map_err(|e| PipelineError::Llm {
        message: format!("Failed to parse {label} response: {e}"),
        status_code: None,
    })
}

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider based on provider name, config, and optional model override.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier ("gemini", "openai", "anthropic")
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    /// * `timeout` - Optional per-request timeout
    ///
    /// The credential is resolved here, so a missing key fails before any
    /// file is touched or request sent.
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Box<dyn LlmProvider>, ConfigError> {
        match provider {
            "gemini" => {
                let cfg = config.gemini.clone().unwrap_or_default();
                let api_key = resolve_api_key("Gemini", &cfg.api_key, "GEMINI_API_KEY")?;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    model,
                    timeout,
                )))
            }
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_api_key("OpenAI", &cfg.api_key, "OPENAI_API_KEY")?;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    model,
                    timeout,
                )))
            }
            "anthropic" => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = resolve_api_key("Anthropic", &cfg.api_key, "ANTHROPIC_API_KEY")?;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    model,
                    timeout,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown LLM provider: {other} (expected gemini, openai or anthropic)"
            ))),
        }
    }
}

/// One-shot HTTP server for exercising providers against canned replies.
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single request with `status` and `body`. Returns the base URL
    /// and a handle resolving to the raw request text.
    pub async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}"), handle)
    }

    /// Read headers and a `content-length` body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
