//! End-to-end batch runs through the public API with a scripted provider.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use scriptor_core::config::GeminiConfig;
use scriptor_core::{
    BatchRunner, Config, ConfigError, LlmProvider, LlmProviderFactory, PipelineError, RunConfig,
    TranscriptionRequest, TranscriptionResponse,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Returns a fixed usage per call and logs the prompt it was sent.
struct ScriptedProvider {
    usage: Vec<(u64, u64)>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn generate(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResponse, PipelineError> {
        let mut prompts = self.prompts.lock().unwrap();
        let (input_tokens, output_tokens) = self.usage[prompts.len()];
        prompts.push(request.prompt.clone());
        Ok(TranscriptionResponse {
            text: "„Vorarlberger Frage“".to_string(),
            input_tokens,
            output_tokens,
            model: "scripted-1".to_string(),
            latency_ms: 1,
        })
    }
}

fn write_page(path: &Path) {
    DynamicImage::new_luma8(32, 48)
        .to_rgb8()
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

fn config_for(input: &Path, output: &Path) -> Config {
    let mut config = Config::default();
    config.paths.input_dir = input.to_string_lossy().into_owned();
    config.paths.output_dir = output.to_string_lossy().into_owned();
    config.transcription.prompt = "Transcribe this page.".to_string();
    config
}

#[tokio::test]
async fn token_totals_and_cost_match_per_call_usage() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    for name in ["p1.jpg", "p2.jpg", "p3.jpg"] {
        write_page(&input.path().join(name));
    }

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let provider = ScriptedProvider {
        usage: vec![(1000, 200), (1100, 300), (900, 250)],
        prompts: prompts.clone(),
    };
    let config = config_for(input.path(), output.path());
    let runner = BatchRunner::new(RunConfig::from_config(&config), Box::new(provider));

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.input_tokens, 3000);
    assert_eq!(summary.output_tokens, 750);
    assert_eq!(summary.average_output_tokens, Some(250.0));
    // 3000 * 2.5 / 1e6 + 750 * 10 / 1e6
    assert!((summary.total_cost_usd - 0.015).abs() < 1e-12);

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts.iter().all(|p| p == "Transcribe this page."));

    let text = std::fs::read_to_string(output.path().join("p2.txt")).unwrap();
    assert_eq!(text, "„Vorarlberger Frage“");
}

#[test]
fn missing_credential_names_the_variable() {
    let mut config = Config::default();
    config.llm.gemini = Some(GeminiConfig {
        api_key: "${SCRIPTOR_INTEGRATION_UNSET_KEY}".to_string(),
        ..GeminiConfig::default()
    });

    let result = LlmProviderFactory::create("gemini", &config.llm, None, None);
    assert!(matches!(
        result,
        Err(ConfigError::MissingCredential { ref variable, .. })
            if variable == "SCRIPTOR_INTEGRATION_UNSET_KEY"
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_image_entry_aborts_before_any_call() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_page(&input.path().join("a.jpg"));
    std::os::unix::fs::symlink(input.path().join("missing.jpg"), input.path().join("b.jpg"))
        .unwrap();

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let provider = ScriptedProvider {
        usage: vec![(1000, 200)],
        prompts: prompts.clone(),
    };
    let config = config_for(input.path(), output.path());
    let runner = BatchRunner::new(RunConfig::from_config(&config), Box::new(provider));

    let err = runner.run().await.unwrap_err();
    assert!(err.to_string().contains("b.jpg"));
    assert!(prompts.lock().unwrap().is_empty());
    assert!(!output.path().join("a.txt").exists());
}

#[tokio::test]
async fn missing_input_directory_is_an_error() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_for(&scratch.path().join("absent"), &scratch.path().join("out"));
    let provider = ScriptedProvider {
        usage: vec![],
        prompts: Arc::new(Mutex::new(Vec::new())),
    };
    let runner = BatchRunner::new(RunConfig::from_config(&config), Box::new(provider));

    let err = runner.run().await.unwrap_err();
    assert!(err.to_string().contains("Input directory not found"));
}
