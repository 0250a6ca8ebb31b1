//! Storage layer
//!
//! Synchronous text reads and writes against the local filesystem. Documents
//! are small, so every operation completes within the frame that issues it.

pub mod local;

pub use local::LocalStorage;

use thiserror::Error;

/// Storage error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// File or directory not found
    #[error("not found: {0}")]
    NotFound(String),
    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl StorageError {
    /// Map an I/O error for the given path
    pub fn from_io(path: &str, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                StorageError::PermissionDenied(format!("{}: {}", path, e))
            }
            _ => StorageError::Io(format!("{}: {}", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            StorageError::from_io("level.json", not_found),
            StorageError::NotFound("level.json".to_string())
        );

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from_io("level.json", denied),
            StorageError::PermissionDenied(_)
        ));

        let other = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert!(matches!(StorageError::from_io("level.json", other), StorageError::Io(_)));
    }
}
