//! OpenAI LLM provider using the Chat Completions API.
//!
//! Sends the page via data URL in the user message content array.

use super::provider::{post_json, LlmProvider, TranscriptionRequest, TranscriptionResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl OpenAiProvider {
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
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    detail: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

fn build_request(model: &str, request: &TranscriptionRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        max_tokens: request.max_output_tokens,
        temperature: request.temperature,
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ChatContent::Text {
                    text: request.prompt.clone(),
                },
                // Full resolution: small print in scans is lost at "low"
                ChatContent::ImageUrl {
                    image_url: ImageUrl {
                        url: request.image.data_url(),
                        detail: "high".to_string(),
                    },
                },
            ],
        }],
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
            .header("Authorization", format!("Bearer {}", self.api_key));
        let chat_resp: ChatResponse = post_json("OpenAI", http, &body, self.timeout).await?;

        let text = chat_resp
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| PipelineError::Llm {
                message: "OpenAI returned empty choices array, no content generated".to_string(),
                status_code: None,
            })?;

        let (input_tokens, output_tokens) = chat_resp
            .usage
            .map_or((0, 0), |u| (u.prompt_tokens, u.completion_tokens));

        Ok(TranscriptionResponse {
            text,
            input_tokens,
            output_tokens,
            model: chat_resp.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
