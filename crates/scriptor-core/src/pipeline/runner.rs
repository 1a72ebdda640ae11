//! Batch orchestration: clear the output directory, then transcribe every
//! discovered image in order, one inference call at a time.
//!
//! The first failure aborts the run. Transcripts already written stay on disk;
//! images after the failing one are never sent.

use std::path::PathBuf;

use crate::config::{Config, LimitsConfig, TranscriptionConfig};
use crate::error::Result;
use crate::llm::{LlmProvider, TranscriptionRequest};
use crate::types::{ImageFile, TranscriptRecord};
use crate::usage::{Pricing, RunCounters, RunSummary};

use super::decode::ImageDecoder;
use super::discovery::FileDiscovery;
use super::sink::OutputSink;
use super::validate::Validator;

/// Everything a run needs besides the provider.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub extension: String,
    pub transcription: TranscriptionConfig,
    pub limits: LimitsConfig,
    pub pricing: Pricing,
}

impl RunConfig {
    /// Build from the loaded configuration, resolving paths.
    pub fn from_config(config: &Config) -> Self {
        Self {
            input_dir: config.input_dir(),
            output_dir: config.output_dir(),
            extension: config.paths.extension.clone(),
            transcription: config.transcription.clone(),
            limits: config.limits.clone(),
            pricing: Pricing::from(&config.pricing),
        }
    }
}

/// Sequential transcription runner.
pub struct BatchRunner {
    config: RunConfig,
    provider: Box<dyn LlmProvider>,
    discovery: FileDiscovery,
    validator: Validator,
    decoder: ImageDecoder,
    sink: OutputSink,
}

impl BatchRunner {
    pub fn new(config: RunConfig, provider: Box<dyn LlmProvider>) -> Self {
        Self {
            discovery: FileDiscovery::new(&config.extension),
            validator: Validator::new(&config.limits),
            decoder: ImageDecoder::new(&config.limits),
            sink: OutputSink::new(config.output_dir.clone()),
            config,
            provider,
        }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Find the images this run would process, without side effects.
    pub fn discover(&self) -> Result<Vec<ImageFile>> {
        Ok(self.discovery.discover(&self.config.input_dir)?)
    }

    /// Run the batch without a progress callback.
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with(|_, _| {}).await
    }

    /// Run the batch, calling `on_file` after each transcript is written.
    ///
    /// The callback receives the record and the number of images discovered.
    pub async fn run_with<F>(&self, mut on_file: F) -> Result<RunSummary>
    where
        F: FnMut(&TranscriptRecord, usize),
    {
        let mut counters = RunCounters::start();

        let removed = self.sink.clear()?;
        if removed > 0 {
            tracing::info!(
                "Cleared {removed} previous transcript(s) from {:?}",
                self.sink.dir()
            );
        }

        let files = self.discover()?;
        let total = files.len();
        if files.is_empty() {
            tracing::warn!(
                "No .{} files found in {:?}",
                self.config.extension,
                self.config.input_dir
            );
        } else {
            tracing::info!(
                "Found {total} image(s); transcribing with {} ({})",
                self.provider.name(),
                self.provider.model()
            );
        }

        for (index, file) in files.iter().enumerate() {
            tracing::info!("Processing file ({}/{total}): {}", index + 1, file.file_name());
            let record = self.transcribe_file(file, &mut counters).await?;
            on_file(&record, total);
        }

        Ok(counters.finish(&self.config.pricing))
    }

    /// Validate, decode, transcribe and write a single image, adding its
    /// token usage to `counters`.
    pub async fn transcribe_file(
        &self,
        file: &ImageFile,
        counters: &mut RunCounters,
    ) -> Result<TranscriptRecord> {
        self.validator.validate(&file.path)?;
        let decoded = self.decoder.decode(&file.path).await?;
        tracing::debug!(
            "Decoded {:?} ({}x{}, {} bytes)",
            file.path,
            decoded.width,
            decoded.height,
            decoded.bytes.len()
        );

        let request = TranscriptionRequest::new(decoded.to_input(), &self.config.transcription);
        let response = self.provider.generate(&request).await?;
        tracing::info!(
            "Received answer for {}. Tokens (in/out): {} / {}",
            file.id,
            response.input_tokens,
            response.output_tokens
        );
        counters.record(&response);

        let output_path = self.sink.write(&file.id, &response.text)?;
        tracing::debug!("Saved transcript for {} to {:?}", file.id, output_path);

        Ok(TranscriptRecord {
            id: file.id.clone(),
            image_path: file.path.clone(),
            output_path,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            model: response.model,
            latency_ms: response.latency_ms,
            chars: response.text.chars().count(),
        })
    }
}
