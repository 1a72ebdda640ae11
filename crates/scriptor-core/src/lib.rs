//! Scriptor Core - batch transcription of page scans through multimodal LLMs.
//!
//! Each image in an input directory is sent, together with a fixed prompt,
//! to an inference API. The returned text is written to `<id>.txt` and the
//! reported token usage is summed into a cost summary.
//!
//! # Architecture
//!
//! A single sequential pass with no concurrency and no retries:
//!
//! ```text
//! Clear output → Discover → Validate → Decode → Provider call → Write .txt → Count
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use scriptor_core::{BatchRunner, Config, LlmProviderFactory, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> scriptor_core::Result<()> {
//!     let config = Config::load()?;
//!     let provider = LlmProviderFactory::create("gemini", &config.llm, None, None)?;
//!     let runner = BatchRunner::new(RunConfig::from_config(&config), provider);
//!
//!     let summary = runner.run().await?;
//!     println!("Tokens (in/out): {} / {}", summary.input_tokens, summary.output_tokens);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod usage;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, Result, ScriptorError};
pub use llm::{LlmProvider, LlmProviderFactory, TranscriptionRequest, TranscriptionResponse};
pub use pipeline::{BatchRunner, RunConfig};
pub use report::{ReportFormat, ReportWriter, RunReport};
pub use types::{ImageFile, TranscriptRecord};
pub use usage::{Pricing, RunCounters, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
