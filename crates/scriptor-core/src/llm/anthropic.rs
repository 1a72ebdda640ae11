//! Anthropic LLM provider using the Messages API.
//!
//! Sends image + prompt via the Anthropic Messages API with base64 image content blocks.

use super::provider::{post_json, LlmProvider, TranscriptionRequest, TranscriptionResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// The Messages API requires `max_tokens`; used when none is configured.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic provider using the Messages API.
pub struct AnthropicProvider {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Option<Duration>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "image")]
    Image { source: ImageSource },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
    model: String,
    usage: Usage,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

fn build_request(model: &str, request: &TranscriptionRequest) -> MessagesRequest {
    MessagesRequest {
        model: model.to_string(),
        max_tokens: request.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: request.temperature.min(1.0),
        messages: vec![Message {
            role: "user".to_string(),
            content: vec![
                ContentBlock::Image {
                    source: ImageSource {
                        source_type: "base64".to_string(),
                        media_type: request.image.media_type.clone(),
                        data: request.image.data.clone(),
                    },
                },
                ContentBlock::Text {
                    text: request.prompt.clone(),
                },
            ],
        }],
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResponse, PipelineError> {
        let start = Instant::now();
        let body = build_request(&self.model, request);

        let http = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01");
        let messages_resp: MessagesResponse =
            post_json("Anthropic", http, &body, self.timeout).await?;

        let text = messages_resp
            .content
            .into_iter()
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(PipelineError::Llm {
                message: "Anthropic returned empty response, no text content generated"
                    .to_string(),
                status_code: None,
            });
        }

        Ok(TranscriptionResponse {
            text,
            input_tokens: messages_resp.usage.input_tokens,
            output_tokens: messages_resp.usage.output_tokens,
            model: messages_resp.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
