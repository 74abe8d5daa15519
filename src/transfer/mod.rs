//! Transfer module
//!
//! Moves upload bodies from the wire onto disk.

pub mod file_ops;

pub use file_ops::{UploadTarget, handle_file_upload};
