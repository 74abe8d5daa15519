//! File system storage management
//!
//! Path resolution, filename allocation and the read-side operations over
//! the storage tree.

pub mod filesystem;
pub mod naming;
pub mod operations;
pub mod results;
pub mod validation;

pub use filesystem::StorageRoot;
pub use naming::{allocate, candidate_name, reserve};
pub use operations::{delete_file, list_directory, object_info};
pub use results::{DeleteResult, ListResult, ObjectRecord, StoreResult};
pub use validation::RelativePath;
