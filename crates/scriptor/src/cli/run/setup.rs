//! Run setup: config overrides, provider creation, runner assembly.

use scriptor_core::{BatchRunner, Config, LlmProviderFactory, RunConfig};
use std::time::Duration;

use super::RunArgs;

/// Apply command-line overrides on top of the loaded config and return the
/// provider name to use.
pub fn apply_overrides(args: &RunArgs, config: &mut Config) -> String {
    if let Some(ref input) = args.input {
        config.paths.input_dir = input.to_string_lossy().into_owned();
    }
    if let Some(ref output) = args.output {
        config.paths.output_dir = output.to_string_lossy().into_owned();
    }
    if let Some(ref extension) = args.extension {
        config.paths.extension = extension.clone();
    }
    if let Some(temperature) = args.temperature {
        config.transcription.temperature = temperature;
    }

    match args.provider {
        Some(provider) => provider.to_string(),
        None => config.llm.provider.clone(),
    }
}

/// Build the runner. The provider credential is resolved here, so a missing
/// key aborts before the output directory is cleared or any request is sent.
pub fn setup_runner(args: &RunArgs, mut config: Config) -> anyhow::Result<BatchRunner> {
    let provider_name = apply_overrides(args, &mut config);
    config.validate()?;

    let timeout = config.limits.request_timeout_ms.map(Duration::from_millis);
    let provider = LlmProviderFactory::create(
        &provider_name,
        &config.llm,
        args.model.as_deref(),
        timeout,
    )?;
    tracing::debug!(
        "Using provider {} with model {}",
        provider.name(),
        provider.model()
    );

    Ok(BatchRunner::new(RunConfig::from_config(&config), provider))
}
