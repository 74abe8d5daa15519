//! Storage result types
//!
//! Defines result structures returned by storage operations. All of them
//! serialize straight into response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::Metadata;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::storage::validation::RelativePath;

/// Metadata snapshot of a file or directory under the storage root.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectRecord {
    pub name: String,
    pub path: String,
    pub absolute_path: PathBuf,
    pub url: Option<String>,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub is_file: bool,
    pub is_directory: bool,
}

impl ObjectRecord {
    /// Builds a record for `relative`. Only files get a URL.
    pub fn new(
        relative: &RelativePath,
        absolute_path: PathBuf,
        metadata: &Metadata,
        base_url: &str,
    ) -> Self {
        let path = relative.to_string();
        let is_file = metadata.is_file();
        let url = is_file.then(|| object_url(base_url, &path));

        Self {
            name: relative.file_name().unwrap_or_default().to_string(),
            path,
            absolute_path,
            url,
            size: metadata.len(),
            created: timestamp(metadata.created()),
            modified: timestamp(metadata.modified()),
            accessed: timestamp(metadata.accessed()),
            is_file,
            is_directory: metadata.is_dir(),
        }
    }
}

fn timestamp(time: io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// `{base}/{path}` with exactly one separator between the two.
pub fn object_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Result of a directory listing operation
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub directory: String,
    pub count: usize,
    pub files: Vec<ObjectRecord>,
}

/// Result of a file storage operation
#[derive(Debug, Clone, Serialize)]
pub struct StoreResult {
    pub filename: String,
    pub directory: String,
    pub path: PathBuf,
    pub relative_path: String,
    pub url: String,
    pub size: u64,
}

/// Result of a file deletion operation
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub deleted: String,
}
