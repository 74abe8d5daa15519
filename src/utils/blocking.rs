//! Offloading of synchronous filesystem work
//!
//! Path resolution and directory reads use `std::fs`; request handlers run
//! them on tokio's blocking pool so they never stall an async worker.

use std::io;

use crate::error::{Result, StorageError};

/// Runs `f` on the blocking thread pool and flattens a panicked or
/// cancelled task into an I/O failure.
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Io(io::Error::other(e)))?
}
