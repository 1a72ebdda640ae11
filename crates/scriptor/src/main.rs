//! Scriptor CLI - batch transcription of page scans through multimodal LLMs.
//!
//! Every image in the input directory is sent with a fixed prompt to an
//! inference API; the answer is saved as `<image>.txt` and the token usage
//! is summed into a cost summary.
//!
//! # Usage
//!
//! ```bash
//! # Transcribe with the configured defaults (Gemini, ../image_data → ../answers/google)
//! scriptor run
//!
//! # Other directories and provider, plus a JSON report
//! scriptor run --input ./scans --output ./answers/openai --provider openai --report run.json
//!
//! # View configuration
//! scriptor config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Scriptor - batch transcription of page scans through multimodal LLMs.
#[derive(Parser, Debug)]
#[command(name = "scriptor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "SCRIPTOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe every image in the input directory
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys usually live in a .env next to the scans
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e.into()),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `scriptor config path`."
            );
            scriptor_core::Config::default()
        }
    };
    logging::init(&logging::LogSettings::resolve(
        &config.logging,
        cli.verbose,
        cli.json_logs,
    ));

    tracing::debug!("Scriptor v{}", scriptor_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
