//! Transcript output directory: cleared at the start of a run, one `.txt` per image.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Writes transcripts into a single output directory.
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the transcript for `id` is written to.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.txt"))
    }

    /// Remove every file directly inside the output directory.
    ///
    /// Subdirectories and their contents are left in place. A missing
    /// directory counts as already clear. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize, PipelineError> {
        let clear_err = |source| PipelineError::Clear {
            path: self.dir.clone(),
            source,
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(clear_err(e)),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(clear_err)?;
            if entry.file_type().map_err(clear_err)?.is_dir() {
                continue;
            }
            std::fs::remove_file(entry.path()).map_err(clear_err)?;
            removed += 1;
        }

        tracing::debug!("Cleared {removed} file(s) from {:?}", self.dir);
        Ok(removed)
    }

    /// Write `text` verbatim as UTF-8 to `<dir>/<id>.txt`, creating the directory if needed.
    pub fn write(&self, id: &str, text: &str) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| PipelineError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(id);
        std::fs::write(&path, text.as_bytes()).map_err(|source| PipelineError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
