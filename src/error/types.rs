//! Error types
//!
//! Defines the error kinds every storage operation can report. Each kind is
//! machine-distinguishable through [`StorageError::kind`] so the boundary can
//! turn it into a structured response.

use std::io;

use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Path escapes storage root: {0}")]
    PathEscape(String),

    #[error("No file provided")]
    NoFileProvided,

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Stable identifier reported to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::NotFound(_) => "NotFound",
            StorageError::NotAFile(_) => "NotAFile",
            StorageError::NotADirectory(_) => "NotADirectory",
            StorageError::PathEscape(_) => "PathEscape",
            StorageError::NoFileProvided => "NoFileProvided",
            StorageError::PayloadTooLarge { .. } => "PayloadTooLarge",
            StorageError::InvalidRequest(_) => "InvalidRequest",
            StorageError::Io(_) => "IOFailure",
        }
    }

    /// Maps an I/O error on `path` to `NotFound` when the target is absent
    /// and to `NotADirectory` when a file sits where a directory was
    /// expected, keeping every other failure as `Io`.
    pub fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(display_path(path)),
            io::ErrorKind::NotADirectory => StorageError::NotADirectory(display_path(path)),
            _ => StorageError::Io(error),
        }
    }
}

/// Renders a relative path for messages; the root is shown as `/`.
pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
