//! Machine-readable run report.
//!
//! Collects the per-file records and the final summary of a run and writes
//! them as a single JSON document or as JSON Lines.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::types::TranscriptRecord;
use crate::usage::RunSummary;

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One JSON object holding all files and the summary
    Json,
    /// One JSON object per line: file records, then the summary
    JsonLines,
}

/// A line of a JSONL report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportLine {
    File(TranscriptRecord),
    Summary(RunSummary),
}

/// Everything recorded about a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub provider: String,
    pub model: String,
    pub files: Vec<TranscriptRecord>,
    pub summary: RunSummary,
}

/// A writer that serializes a run report to JSON or JSONL.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: ReportFormat) -> Self {
        Self { writer, format }
    }

    /// Write the report and flush.
    pub fn write(&mut self, report: &RunReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, report)
                    .map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
            ReportFormat::JsonLines => {
                for record in &report.files {
                    self.write_line(&ReportLine::File(record.clone()))?;
                }
                self.write_line(&ReportLine::Summary(report.summary.clone()))?;
            }
        }
        self.writer.flush()
    }

    fn write_line(&mut self, line: &ReportLine) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, line).map_err(io::Error::other)?;
        writeln!(self.writer)
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_report() -> RunReport {
        let record = |id: &str, out: u64| TranscriptRecord {
            id: id.to_string(),
            image_path: PathBuf::from(format!("/scans/{id}.jpg")),
            output_path: PathBuf::from(format!("/answers/{id}.txt")),
            input_tokens: 1290,
            output_tokens: out,
            model: "gemini-2.5-flash".to_string(),
            latency_ms: 4200,
            chars: 1800,
        };
        RunReport {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            files: vec![record("a", 400), record("b", 600)],
            summary: RunSummary {
                files_processed: 2,
                input_tokens: 2580,
                output_tokens: 1000,
                elapsed_secs: 8.4,
                average_output_tokens: Some(500.0),
                input_cost_usd: 0.00645,
                output_cost_usd: 0.01,
                total_cost_usd: 0.01645,
            },
        }
    }

    #[test]
    fn test_write_json_document() {
        let mut writer = ReportWriter::new(Vec::new(), ReportFormat::Json);
        writer.write(&sample_report()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let parsed: RunReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.files.len(), 2);
        assert_eq!(parsed.summary.output_tokens, 1000);
    }

    #[test]
    fn test_write_jsonl_summary_last() {
        let mut writer = ReportWriter::new(Vec::new(), ReportFormat::JsonLines);
        writer.write(&sample_report()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<ReportLine> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[0], ReportLine::File(ref r) if r.id == "a"));
        assert!(matches!(lines[2], ReportLine::Summary(ref s) if s.files_processed == 2));
        assert!(output.lines().next().unwrap().contains("\"type\":\"file\""));
    }
}
