//! Local filesystem storage backend

use super::StorageError;
use std::path::{Path, PathBuf};

/// Local filesystem storage, resolving relative paths against a base directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    /// Base directory for relative paths (usually current working directory)
    base_dir: PathBuf,
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorage {
    /// Create a new local storage backend rooted at the current directory
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }

    /// Create a local storage backend with a custom base directory
    #[cfg(test)]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a path relative to the base directory
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Read a whole file as UTF-8 text
    pub fn read_text(&self, path: &str) -> Result<String, StorageError> {
        std::fs::read_to_string(self.resolve(path)).map_err(|e| StorageError::from_io(path, e))
    }

    /// Create or overwrite a file with the given text
    pub fn write_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(path);

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::from_io(path, e))?;
        }

        std::fs::write(&full_path, text).map_err(|e| StorageError::from_io(path, e))
    }
}
