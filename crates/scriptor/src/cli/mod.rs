//! Subcommand implementations.

pub mod config;
pub mod run;

use scriptor_core::{Config, ConfigError};
use std::path::Path;

/// Load the config from `path`, or from the default location when none is given.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
