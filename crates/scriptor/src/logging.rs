//! Tracing subscriber setup from the `[logging]` config section and CLI flags.
//!
//! All log output goes to stderr so it interleaves with the progress bar and
//! summary; stdout carries only dry-run listings.

use scriptor_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// HTTP client internals are noisy at debug level.
const QUIET_DEPENDENCIES: &str = "hyper_util=warn,reqwest=warn,rustls=warn";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Resolved subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub directive: String,
    pub json: bool,
}

impl LogSettings {
    /// Combine the config section with the `-v` and `--json-logs` flags.
    ///
    /// An unknown `level` falls back to `info` with a warning on stderr,
    /// since the subscriber is not running yet.
    pub fn resolve(config: &LoggingConfig, verbose: bool, json_logs: bool) -> Self {
        let configured = config.level.trim().to_lowercase();
        let level = if verbose && configured != "trace" {
            "debug".to_string()
        } else if LEVELS.contains(&configured.as_str()) {
            configured
        } else {
            eprintln!(
                "Warning: unknown logging.level '{}', using 'info'",
                config.level
            );
            "info".to_string()
        };

        Self {
            directive: format!("{level},{QUIET_DEPENDENCIES}"),
            json: json_logs || config.format.eq_ignore_ascii_case("json"),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the resolved directive.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.directive));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
