//! Module `file_ops`
//!
//! Writes upload bodies to disk. The final name is reserved first with an
//! exclusive create, the body is streamed into a hidden staging sibling and
//! only a complete file is renamed over the reservation, so readers never
//! see a partially written object under its final name.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use log::{error, info, warn};
use std::io;
use std::path::PathBuf;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StorageError};
use crate::storage::StorageRoot;
use crate::storage::naming::{self, sanitize_name};
use crate::storage::results::{StoreResult, object_url};
use crate::utils::run_blocking;

/// Where an upload goes, resolved once at the boundary.
#[derive(Debug, Clone, Default)]
pub struct UploadTarget {
    /// Raw directory string; empty means the root.
    pub directory: String,
    /// Desired base name, with or without extension.
    pub desired_name: Option<String>,
    /// Filename the client sent with the payload.
    pub original_name: String,
}

/// Files an upload has claimed on disk but not yet committed.
///
/// Dropping it before [`commit`](Self::commit) removes the placeholder and
/// the staging file, whether the upload failed with an error or its future
/// was dropped mid-stream.
struct PendingUpload {
    final_path: PathBuf,
    staging_path: Option<PathBuf>,
    committed: bool,
}

impl PendingUpload {
    fn new(final_path: PathBuf) -> Self {
        Self {
            final_path,
            staging_path: None,
            committed: false,
        }
    }

    async fn commit(mut self) -> io::Result<()> {
        if let Some(staging_path) = &self.staging_path {
            fs::rename(staging_path, &self.final_path).await?;
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        for path in self.staging_path.iter().chain(Some(&self.final_path)) {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to clean up {}: {}", path.display(), e);
                }
            }
        }
        warn!("Discarded incomplete upload {}", self.final_path.display());
    }
}

/// Handles storing an upload body under the storage root.
///
/// `max_bytes` caps the payload; exceeding it fails with
/// [`StorageError::PayloadTooLarge`] and leaves nothing behind.
pub async fn handle_file_upload<S, E>(
    root: &StorageRoot,
    target: UploadTarget,
    body: S,
    max_bytes: u64,
    base_url: &str,
) -> Result<StoreResult>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let original = sanitize_name(&target.original_name).ok_or(StorageError::NoFileProvided)?;

    let UploadTarget {
        directory,
        desired_name,
        ..
    } = target;

    let candidate = naming::candidate_name(&original, desired_name.as_deref());
    if naming::is_staging_name(&candidate) {
        return Err(StorageError::InvalidRequest(format!(
            "{candidate} is reserved for in-progress uploads"
        )));
    }

    let reservation_root = root.clone();
    let (relative_dir, filename, pending, staging_file) = run_blocking(move || {
        let (relative_dir, dir_path) = reservation_root.prepare_directory(&directory)?;
        let (filename, _placeholder) =
            naming::reserve(&dir_path, &original, desired_name.as_deref())?;

        let mut pending = PendingUpload::new(dir_path.join(&filename));
        let (staging, staging_file) = naming::reserve_staging(&dir_path, &filename)?;
        pending.staging_path = Some(dir_path.join(staging));

        Ok((relative_dir, filename, pending, staging_file))
    })
    .await?;

    let relative_path = relative_dir.child(&filename).to_string();
    info!(
        "Starting file upload: {} -> {}",
        relative_path,
        pending.final_path.display()
    );

    let size = write_staged(File::from_std(staging_file), body, max_bytes).await?;

    let final_path = pending.final_path.clone();
    pending.commit().await.map_err(|e| {
        error!("Failed to commit upload {}: {}", final_path.display(), e);
        StorageError::Io(e)
    })?;

    info!(
        "File upload completed successfully: {} ({} bytes)",
        relative_path, size
    );

    Ok(StoreResult {
        url: object_url(base_url, &relative_path),
        filename,
        directory: relative_dir.to_string(),
        path: final_path,
        relative_path,
        size,
    })
}

/// Streams `body` into the staging file and syncs it.
async fn write_staged<S, E>(mut file: File, body: S, max_bytes: u64) -> Result<u64>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut body = std::pin::pin!(body);
    let mut total_bytes_received = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            let e: Box<dyn std::error::Error + Send + Sync> = e.into();
            StorageError::InvalidRequest(format!("upload body interrupted: {e}"))
        })?;

        // Check size limit BEFORE writing (fail fast)
        total_bytes_received += chunk.len() as u64;
        if total_bytes_received > max_bytes {
            warn!(
                "Upload size limit exceeded: {} bytes > {} bytes",
                total_bytes_received, max_bytes
            );
            return Err(StorageError::PayloadTooLarge { limit: max_bytes });
        }

        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    file.sync_all().await?;

    Ok(total_bytes_received)
}
