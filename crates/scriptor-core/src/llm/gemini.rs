//! Google Gemini provider using the `generateContent` REST endpoint.
//!
//! Sends the prompt followed by the page as an `inlineData` part and reads
//! token usage from `usageMetadata`.

use super::provider::{post_json, LlmProvider, TranscriptionRequest, TranscriptionResponse};
use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Gemini provider.
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Option<Duration>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn build_request(request: &TranscriptionRequest) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::Text {
                    text: request.prompt.clone(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: request.image.media_type.clone(),
                        data: request.image.data.clone(),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(resp: &GenerateResponse) -> Result<String, PipelineError> {
    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(PipelineError::Llm {
            message: format!("Gemini blocked the prompt: {reason}"),
            status_code: None,
        });
    }

    let candidate = resp.candidates.first().ok_or_else(|| PipelineError::Llm {
        message: "Gemini returned no candidates".to_string(),
        status_code: None,
    })?;

    let texts: Vec<&str> = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if texts.is_empty() {
        return Err(PipelineError::Llm {
            message: format!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
            status_code: None,
        });
    }

    Ok(texts.concat())
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResponse, PipelineError> {
        let start = Instant::now();
        let body = build_request(request);

        let http = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key);
        let resp: GenerateResponse = post_json("Gemini", http, &body, self.timeout).await?;

        let text = extract_text(&resp)?;
        let usage = resp.usage_metadata.as_ref().ok_or_else(|| PipelineError::Llm {
            message: "Gemini response has no usageMetadata".to_string(),
            status_code: None,
        })?;

        Ok(TranscriptionResponse {
            text,
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            model: resp.model_version.unwrap_or_else(|| self.model.clone()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscriptionConfig;
    use crate::llm::provider::test_server::serve_once;
    use crate::llm::provider::ImageInput;

    fn sample_request() -> TranscriptionRequest {
        let image = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpeg");
        TranscriptionRequest::new(image, &TranscriptionConfig::default())
    }

    #[test]
    fn test_url_joins_model_and_method() {
        let provider = GeminiProvider::new(
            "https://generativelanguage.googleapis.com/v1beta/models/",
            "k",
            "gemini-2.5-flash",
            None,
        );
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(build_request(&sample_request())).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("Fraktur"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_extract_text_concatenates_parts_verbatim() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"parts": [{"text": "Vorarlberg, "}, {"text": "im Jahre 1918.\n"}], "role": "model"},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 1290, "candidatesTokenCount": 412, "totalTokenCount": 1702},
                "modelVersion": "gemini-2.5-flash"
            }"#,
        )
        .unwrap();

        assert_eq!(extract_text(&resp).unwrap(), "Vorarlberg, im Jahre 1918.\n");
        let usage = resp.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 1290);
        assert_eq!(usage.candidates_token_count, 412);
    }

    #[test]
    fn test_extract_text_without_parts_is_error() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"finishReason": "RECITATION"}]}"#,
        )
        .unwrap();
        let err = extract_text(&resp).unwrap_err();
        assert!(err.to_string().contains("RECITATION"));
    }

    fn local_provider(base: &str) -> GeminiProvider {
        let mut provider = GeminiProvider::new(
            &format!("{base}/v1beta/models"),
            "test-key",
            "gemini-2.5-flash",
            Some(Duration::from_secs(5)),
        );
        provider.client = reqwest::Client::builder().no_proxy().build().unwrap();
        provider
    }

    #[tokio::test]
    async fn test_generate_maps_usage_metadata() {
        let (base, request) = serve_once(
            "200 OK",
            r#"{
                "candidates": [{"content": {"parts": [{"text": "Seite 1"}]}, "finishReason": "STOP"}],
                "usageMetadata": {"promptTokenCount": 1290, "candidatesTokenCount": 412, "thoughtsTokenCount": 900},
                "modelVersion": "gemini-2.5-flash-001"
            }"#,
        )
        .await;

        let response = local_provider(&base).generate(&sample_request()).await.unwrap();
        assert_eq!(response.text, "Seite 1");
        assert_eq!(response.input_tokens, 1290);
        assert_eq!(response.output_tokens, 412);
        assert_eq!(response.model, "gemini-2.5-flash-001");

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent "));
        assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
    }

    #[tokio::test]
    async fn test_generate_without_usage_is_error() {
        let (base, _) = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [{"text": "Seite 1"}]}}]}"#,
        )
        .await;

        let err = local_provider(&base).generate(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("usageMetadata"));
    }

    #[tokio::test]
    async fn test_generate_service_unavailable_keeps_status() {
        let (base, _) = serve_once(
            "503 Service Unavailable",
            r#"{"error": {"code": 503, "message": "The model is overloaded."}}"#,
        )
        .await;

        let err = local_provider(&base).generate(&sample_request()).await.unwrap_err();
        match err {
            PipelineError::Llm { message, status_code } => {
                assert_eq!(status_code, Some(503));
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected LLM error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_malformed_body_is_error() {
        let (base, _) = serve_once("200 OK", "<html>not json</html>").await;

        let err = local_provider(&base).generate(&sample_request()).await.unwrap_err();
        match err {
            PipelineError::Llm { message, status_code } => {
                assert_eq!(status_code, None);
                assert!(message.contains("Failed to parse Gemini response"));
            }
            other => panic!("expected LLM error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        let err = extract_text(&resp).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
