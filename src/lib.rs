pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use error::{Result, StorageError};
pub use server::{AppState, Server, ServerConfig};
pub use storage::{RelativePath, StorageRoot};
