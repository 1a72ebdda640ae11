//! Core data types for the transcription pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image selected for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name without its final extension; names the output `.txt`
    pub id: String,

    /// Full path to the image
    pub path: PathBuf,
}

impl ImageFile {
    /// Build an `ImageFile` from a path, deriving the id from the file stem.
    ///
    /// Non-UTF-8 stems are converted lossily. Returns `None` only for paths
    /// without a file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let id = path.file_stem()?.to_string_lossy().into_owned();
        if id.is_empty() {
            return None;
        }
        Some(Self {
            id,
            path: path.to_path_buf(),
        })
    }

    /// File name portion of the path, for log lines.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// What happened to one image during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Image id (file stem)
    pub id: String,

    /// Source image path
    pub image_path: PathBuf,

    /// Written transcript path
    pub output_path: PathBuf,

    /// Prompt tokens reported by the provider
    pub input_tokens: u64,

    /// Generated tokens reported by the provider
    pub output_tokens: u64,

    /// Model identifier that served the request
    pub model: String,

    /// Round-trip latency of the inference call in milliseconds
    pub latency_ms: u64,

    /// Length of the transcript in characters
    pub chars: usize,
}
