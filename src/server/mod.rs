//! Server core functionality
//!
//! This module contains the server lifecycle, configuration and the state
//! shared with request handlers.

pub mod config;
pub mod core;
pub mod state;

pub use self::config::ServerConfig;
pub use self::core::Server;
pub use self::state::AppState;
