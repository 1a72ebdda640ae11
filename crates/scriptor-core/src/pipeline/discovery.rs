//! File discovery for finding page scans in a directory.

use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::PipelineError;
use crate::types::ImageFile;

/// Discovers image files by extension.
pub struct FileDiscovery {
    extension: String,
}

impl FileDiscovery {
    /// Create a discovery for `extension` (with or without the leading dot).
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_lowercase(),
        }
    }

    /// Find all matching files under `dir`, recursively, in sorted path order.
    ///
    /// Files with other extensions are skipped silently. Any entry that cannot
    /// be read (unreadable directory, dangling link, link loop) is an error,
    /// unless it is a file with another extension.
    pub fn discover(&self, dir: &Path) -> Result<Vec<ImageFile>, PipelineError> {
        if !dir.is_dir() {
            return Err(PipelineError::InputNotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    if e.loop_ancestor().is_none() && !path.is_dir() && !self.is_selected(&path) {
                        tracing::debug!("Skipping unreadable entry {:?}: {e}", path);
                        continue;
                    }
                    return Err(PipelineError::Discovery {
                        path,
                        message: e.to_string(),
                    });
                }
            };

            if !entry.file_type().is_file() || !self.is_selected(entry.path()) {
                continue;
            }
            if let Some(file) = ImageFile::from_path(entry.path()) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        warn_duplicate_ids(&files);
        tracing::debug!("Discovered {} .{} file(s) in {:?}", files.len(), self.extension, dir);
        Ok(files)
    }

    /// Check if a file has the selected extension (case-insensitive).
    fn is_selected(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase() == self.extension)
            .unwrap_or(false)
    }
}

/// Ids name the output file, so two images with the same stem in different
/// subdirectories write to the same transcript. The later one wins.
fn warn_duplicate_ids(files: &[ImageFile]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for file in files {
        if let Some(first) = seen.insert(&file.id, &file.path) {
            tracing::warn!(
                "{:?} and {:?} share id '{}'; {}.txt will hold the transcript of the later one",
                first,
                file.path,
                file.id,
                file.id
            );
        }
    }
}
