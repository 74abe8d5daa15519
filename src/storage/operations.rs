//! Storage operations
//!
//! Read-side operations over the storage tree: list, info and delete. All of
//! them resolve their input through [`StorageRoot`] first and never create
//! directories.

use log::{error, info};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::types::display_path;
use crate::error::{Result, StorageError};
use crate::storage::filesystem::StorageRoot;
use crate::storage::naming::is_staging_name;
use crate::storage::results::{DeleteResult, ListResult, ObjectRecord};

/// Lists the immediate children of `raw_dir`.
///
/// Entries come back in directory enumeration order. In-flight upload
/// staging files are skipped.
pub fn list_directory(root: &StorageRoot, raw_dir: &str, base_url: &str) -> Result<ListResult> {
    let (relative, real_path, metadata) = root.resolve_existing(raw_dir)?;
    let directory = relative.to_string();

    if !metadata.is_dir() {
        return Err(StorageError::NotADirectory(display_path(&directory)));
    }

    let entries = fs::read_dir(&real_path).map_err(|e| {
        error!("Failed to list directory {} (real: {}): {}", directory, real_path.display(), e);
        StorageError::from_io(e, &directory)
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_staging_name(&name) {
            continue;
        }

        // An entry deleted between enumeration and stat is simply gone.
        let metadata = match entry_metadata(root, &entry.path()) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        files.push(ObjectRecord::new(
            &relative.child(&name),
            entry.path(),
            &metadata,
            base_url,
        ));
    }

    info!(
        "Listed directory {} (real: {}) - {} entries",
        display_path(&directory),
        real_path.display(),
        files.len()
    );

    Ok(ListResult {
        directory,
        count: files.len(),
        files,
    })
}

/// Metadata for a listed entry. Symlinks are followed only when their target
/// stays inside the root; dangling or escaping links describe the link itself.
fn entry_metadata(root: &StorageRoot, path: &Path) -> io::Result<fs::Metadata> {
    let link = fs::symlink_metadata(path)?;
    if !link.file_type().is_symlink() {
        return Ok(link);
    }

    match path.canonicalize() {
        Ok(target) if target.starts_with(root.path()) => fs::metadata(path),
        _ => Ok(link),
    }
}

/// Returns the record of a single file or directory.
pub fn object_info(root: &StorageRoot, raw_path: &str, base_url: &str) -> Result<ObjectRecord> {
    let (relative, real_path, metadata) = root.resolve_existing(raw_path)?;
    Ok(ObjectRecord::new(&relative, real_path, &metadata, base_url))
}

/// Deletes a single file. Directories are refused with `NotAFile` and left
/// untouched.
pub fn delete_file(root: &StorageRoot, raw_path: &str) -> Result<DeleteResult> {
    let (relative, real_path) = root.resolve(raw_path)?;
    let virtual_path = relative.to_string();

    let metadata = fs::symlink_metadata(&real_path)
        .map_err(|e| StorageError::from_io(e, &virtual_path))?;

    if metadata.is_dir() || relative.is_root() {
        return Err(StorageError::NotAFile(display_path(&virtual_path)));
    }

    fs::remove_file(&real_path).map_err(|e| {
        error!(
            "Failed to delete file {} (real: {}): {}",
            virtual_path,
            real_path.display(),
            e
        );
        StorageError::from_io(e, &virtual_path)
    })?;

    info!("Deleted file {} (real: {})", virtual_path, real_path.display());

    Ok(DeleteResult {
        deleted: virtual_path,
    })
}
