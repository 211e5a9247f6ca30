use crate::error::Result;
use crate::utils::constants::CSV_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};

/// Enumerates eligible input files under a root directory.
///
/// Non-recursive; only regular files with the configured extension are
/// selected, in directory enumeration order (not sorted), stopping once
/// `limit` files have been collected.
pub struct FileScanner {
    extension: String,
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            extension: CSV_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
        }
    }

    /// Zero matches yields an empty vec; an unreadable root is an error.
    pub fn scan(&self, root: &Path, limit: usize) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(root)? {
            if files.len() >= limit {
                break;
            }

            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str()) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
