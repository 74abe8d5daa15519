//! File system operations
//!
//! Owns the storage root and the filesystem half of path resolution: every
//! resolved path is checked against the canonical root, following symlinks,
//! before it is handed to any other operation.

use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::types::display_path;
use crate::error::{Result, StorageError};
use crate::storage::validation::RelativePath;

/// The single directory under which all objects live.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
}

impl StorageRoot {
    /// Creates the root directory if absent and pins its canonical location.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let root = path.canonicalize()?;
        info!("Storage root: {}", root.display());
        Ok(Self { root })
    }

    /// Canonical absolute path of the root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute location of `relative`.
    pub fn absolute(&self, relative: &RelativePath) -> PathBuf {
        relative.to_path(&self.root)
    }

    /// Read-side resolution: normalizes `raw` and checks containment without
    /// creating anything. The target may or may not exist.
    pub fn resolve(&self, raw: &str) -> Result<(RelativePath, PathBuf)> {
        let relative = RelativePath::parse(raw)?;
        let absolute = self.absolute(&relative);
        self.ensure_contained(&absolute, raw)?;
        Ok((relative, absolute))
    }

    /// Read-side resolution of a target that must exist.
    pub fn resolve_existing(&self, raw: &str) -> Result<(RelativePath, PathBuf, fs::Metadata)> {
        let (relative, absolute) = self.resolve(raw)?;
        let metadata = fs::metadata(&absolute)
            .map_err(|e| StorageError::from_io(e, &relative.to_string()))?;
        Ok((relative, absolute, metadata))
    }

    /// Write-side resolution: like [`resolve`](Self::resolve) but creates the
    /// directory and any missing parents. Re-creating an existing directory is
    /// not an error.
    pub fn prepare_directory(&self, raw: &str) -> Result<(RelativePath, PathBuf)> {
        let (relative, absolute) = self.resolve(raw)?;

        match fs::metadata(&absolute) {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(StorageError::NotADirectory(display_path(&relative.to_string())));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&absolute)?;
                debug!("Created directory {}", absolute.display());
            }
            Err(e) => return Err(StorageError::from_io(e, &relative.to_string())),
        }

        // A symlink swapped in between the check and the creation would
        // surface here.
        self.ensure_contained(&absolute, raw)?;
        Ok((relative, absolute))
    }

    /// Fails with `PathEscape` unless the deepest existing ancestor of `path`
    /// canonicalizes to a location inside the root.
    fn ensure_contained(&self, path: &Path, raw: &str) -> Result<()> {
        if !path.starts_with(&self.root) {
            return Err(StorageError::PathEscape(raw.to_string()));
        }

        for ancestor in path.ancestors() {
            match ancestor.canonicalize() {
                Ok(canonical) => {
                    if canonical.starts_with(&self.root) {
                        return Ok(());
                    }
                    return Err(StorageError::PathEscape(raw.to_string()));
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                    ) =>
                {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::PathEscape(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = StorageRoot::open(tmp.path().join("a/b")).unwrap();
        assert!(root.path().is_dir());
        assert!(root.path().is_absolute());
    }

    #[test]
    fn resolve_does_not_create() {
        let tmp = tempfile::tempdir().unwrap();
        let root = StorageRoot::open(tmp.path()).unwrap();
        let (relative, absolute) = root.resolve("/docs/2024/").unwrap();
        assert_eq!(relative.to_string(), "docs/2024");
        assert_eq!(absolute, root.path().join("docs").join("2024"));
        assert!(!absolute.exists());
    }

    #[test]
    fn prepare_directory_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = StorageRoot::open(tmp.path()).unwrap();
        let (_, first) = root.prepare_directory("pics/holiday").unwrap();
        let (_, second) = root.prepare_directory("pics/holiday/").unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[test]
    fn prepare_directory_rejects_file_target() {
        let tmp = tempfile::tempdir().unwrap();
        let root = StorageRoot::open(tmp.path()).unwrap();
        fs::write(root.path().join("note.txt"), b"x").unwrap();
        assert!(matches!(
            root.prepare_directory("note.txt"),
            Err(StorageError::NotADirectory(_))
        ));
    }

    #[test]
    fn resolve_existing_reports_missing_target() {
        let tmp = tempfile::tempdir().unwrap();
        let root = StorageRoot::open(tmp.path()).unwrap();
        assert!(matches!(
            root.resolve_existing("nope/file.bin"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_rejected() {
        let outside = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let root = StorageRoot::open(tmp.path()).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

        assert!(matches!(
            root.resolve("link/secret.txt"),
            Err(StorageError::PathEscape(_))
        ));
        assert!(matches!(
            root.prepare_directory("link/sub"),
            Err(StorageError::PathEscape(_))
        ));
        assert!(!outside.path().join("sub").exists());
    }
}
