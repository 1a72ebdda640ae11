//! LLM integration for page transcription.
//!
//! Provides a provider abstraction over multiple multimodal backends (Gemini,
//! OpenAI, Anthropic). Each provider sends one image plus prompt per call and
//! reports input and output token counts for the cost summary.

pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod openai;
pub(crate) mod provider;

pub use provider::{
    resolve_env_var, ImageInput, LlmProvider, LlmProviderFactory, TranscriptionRequest,
    TranscriptionResponse,
};
