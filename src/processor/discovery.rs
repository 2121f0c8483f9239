//! Raw file discovery.
//!
//! Finds the raw sensor files of a batch and fixes the order in which they
//! are processed.

use crate::error::{PipelineError, Result};
use std::path::PathBuf;
use tracing::{debug, warn};

/// File discovery component for a raw data directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    raw_dir: PathBuf,
    pattern: String,
}

impl FileDiscovery {
    pub fn new(raw_dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Regular files in the raw directory matching the pattern, sorted by path
    ///
    /// Only the top level is scanned. The sorted order is the processing order
    /// of the batch.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>> {
        if !self.raw_dir.is_dir() {
            return Err(PipelineError::DirectoryNotFound {
                path: self.raw_dir.clone(),
            });
        }

        let escaped_dir = glob::Pattern::escape(&self.raw_dir.to_string_lossy());
        let pattern = format!("{}/{}", escaped_dir, self.pattern);
        debug!("Searching for raw files with pattern: {}", pattern);

        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e),
            }
        }

        files.sort();
        debug!("Found {} raw files in {}", files.len(), self.raw_dir.display());

        Ok(files)
    }
}
