//! Token accounting and cost calculation for a batch run.
//!
//! `RunCounters` is owned by the runner loop and updated once per completed
//! inference call; `finish` turns it into the `RunSummary` printed at the end.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::PricingConfig;
use crate::llm::TranscriptionResponse;

/// Per-million-token USD rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_million_usd: f64,
    pub output_per_million_usd: f64,
}

impl Pricing {
    pub fn new(input_per_million_usd: f64, output_per_million_usd: f64) -> Self {
        Self {
            input_per_million_usd,
            output_per_million_usd,
        }
    }

    /// Cost of `tokens` input tokens in USD.
    pub fn input_cost(&self, tokens: u64) -> f64 {
        tokens as f64 / 1_000_000.0 * self.input_per_million_usd
    }

    /// Cost of `tokens` output tokens in USD.
    pub fn output_cost(&self, tokens: u64) -> f64 {
        tokens as f64 / 1_000_000.0 * self.output_per_million_usd
    }

    /// Total USD cost of a call or run.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        self.input_cost(input_tokens) + self.output_cost(output_tokens)
    }
}

impl From<&PricingConfig> for Pricing {
    fn from(config: &PricingConfig) -> Self {
        Self::new(config.input_per_million_usd, config.output_per_million_usd)
    }
}

/// Running totals for one batch run.
#[derive(Debug, Clone)]
pub struct RunCounters {
    started: Instant,
    files_processed: u64,
    input_tokens: u64,
    output_tokens: u64,
}

impl RunCounters {
    /// Start counting; the elapsed time in the summary is measured from here.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            files_processed: 0,
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    /// Add one completed call to the totals.
    pub fn record(&mut self, response: &TranscriptionResponse) {
        self.files_processed += 1;
        self.input_tokens += response.input_tokens;
        self.output_tokens += response.output_tokens;
    }

    pub fn files_processed(&self) -> u64 {
        self.files_processed
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Finalize the totals into a summary priced with `pricing`.
    pub fn finish(self, pricing: &Pricing) -> RunSummary {
        let average_output_tokens = if self.files_processed == 0 {
            None
        } else {
            Some(self.output_tokens as f64 / self.files_processed as f64)
        };
        let input_cost_usd = pricing.input_cost(self.input_tokens);
        let output_cost_usd = pricing.output_cost(self.output_tokens);
        let total_cost_usd = pricing.cost(self.input_tokens, self.output_tokens);

        RunSummary {
            files_processed: self.files_processed,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            average_output_tokens,
            input_cost_usd,
            output_cost_usd,
            total_cost_usd,
        }
    }
}

/// Final figures of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_processed: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub elapsed_secs: f64,
    /// `None` when no file was processed
    pub average_output_tokens: Option<f64>,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}
