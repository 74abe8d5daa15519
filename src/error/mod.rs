//! Error handling
//!
//! Defines error types and their conversion into responses.

pub mod handlers;
pub mod types;

pub use handlers::error_to_status;
pub use types::{Result, StorageError};
