//! Utility functions
//!
//! Provides logging setup and blocking-task helpers.

pub mod blocking;
pub mod logging;

pub use blocking::run_blocking;
