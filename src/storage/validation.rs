//! Path validation
//!
//! Lexical half of path resolution: turns an untrusted directory or object
//! string into a [`RelativePath`]. The filesystem half (containment against
//! the canonical root, symlinks, directory creation) lives in
//! [`crate::storage::filesystem`].

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, StorageError};

/// A sanitized location below the storage root.
///
/// Holds no empty, `.` or `..` segments and no absolute prefix. The empty
/// path denotes the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RelativePath {
    segments: Vec<String>,
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

impl RelativePath {
    /// The storage root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalizes a raw client string.
    ///
    /// Whitespace and leading/trailing separators are stripped, `.` segments
    /// dropped and `..` collapsed against the preceding segment. A `..` with
    /// nothing left to collapse would leave the root and fails with
    /// [`StorageError::PathEscape`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_matches(is_separator);
        let mut segments: Vec<String> = Vec::new();

        for segment in trimmed.split(is_separator) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(StorageError::PathEscape(raw.to_string()));
                    }
                }
                other => {
                    if !is_plain_segment(other) {
                        return Err(StorageError::PathEscape(raw.to_string()));
                    }
                    segments.push(other.to_string());
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path of the enclosing directory, `None` for the root.
    pub fn parent(&self) -> Option<RelativePath> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Appends a single entry name, as read back from a directory listing or
    /// produced by the naming allocator.
    pub fn child(&self, name: &str) -> RelativePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Absolute location of this path under `root`.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// A segment must be a single normal path component once handed to the OS.
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
