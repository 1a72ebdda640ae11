//! The `scriptor run` command: transcribe every image in the input directory.

mod setup;
mod summary;
pub mod types;

pub use types::{Provider, ReportFormat};

use clap::Args;
use scriptor_core::pipeline::{FileDiscovery, OutputSink};
use scriptor_core::{Config, ReportWriter, RunReport, TranscriptRecord};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use setup::setup_runner;
use summary::print_summary;

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory of page scans (defaults to `paths.input_dir`)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Transcript directory, cleared before the run (defaults to `paths.output_dir`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Inference provider (defaults to `llm.provider`)
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Model name (provider-specific)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Image file extension to select (defaults to `paths.extension`)
    #[arg(long)]
    pub extension: Option<String>,

    /// Sampling temperature (defaults to `transcription.temperature`)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Write a machine-readable report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    pub report_format: ReportFormat,

    /// List the images that would be transcribed, without clearing or sending anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    if args.dry_run {
        return dry_run(&args, config);
    }

    let runner = setup_runner(&args, config)?;
    let total = runner.discover()?.len() as u64;
    let progress = create_progress_bar(total);

    let mut records: Vec<TranscriptRecord> = Vec::new();
    let result = runner
        .run_with(|record, _| {
            progress.inc(1);
            progress.set_message(record.id.clone());
            records.push(record.clone());
        })
        .await;
    progress.finish_and_clear();

    // Fail fast: nothing after the failing file is attempted.
    let summary = result?;
    print_summary(&summary, runner.provider().name(), runner.provider().model());

    if let Some(ref path) = args.report {
        let report = RunReport {
            provider: runner.provider().name().to_string(),
            model: runner.provider().model().to_string(),
            files: records,
            summary,
        };
        write_report(path, &report, args.report_format)?;
        tracing::info!("Report written to {:?}", path);
    }

    Ok(())
}

/// Print the files a run would process.
fn dry_run(args: &RunArgs, mut config: Config) -> anyhow::Result<()> {
    setup::apply_overrides(args, &mut config);
    config.validate()?;

    let files = FileDiscovery::new(&config.paths.extension).discover(&config.input_dir())?;
    let sink = OutputSink::new(config.output_dir());
    for file in &files {
        println!("{} -> {}", file.path.display(), sink.path_for(&file.id).display());
    }
    tracing::info!("{} image(s) would be transcribed", files.len());
    Ok(())
}

fn write_report(path: &Path, report: &RunReport, format: ReportFormat) -> anyhow::Result<()> {
    let file = File::create(path)?;
    ReportWriter::new(BufWriter::new(file), format.into()).write(report)?;
    Ok(())
}

/// Create a progress bar for the batch.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}
