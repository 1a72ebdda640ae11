//! CLI enum types for the run command: provider and report format.

use clap::ValueEnum;
use scriptor_core::ReportFormat as CoreReportFormat;

/// Supported inference providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Google Gemini API
    Gemini,
    /// OpenAI API
    Openai,
    /// Anthropic API
    Anthropic,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Openai => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Report file formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Single JSON document
    #[default]
    Json,
    /// One JSON object per line, summary last
    Jsonl,
}

impl From<ReportFormat> for CoreReportFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => CoreReportFormat::Json,
            ReportFormat::Jsonl => CoreReportFormat::JsonLines,
        }
    }
}
