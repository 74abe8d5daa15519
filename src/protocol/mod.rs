//! HTTP protocol implementation
//!
//! Maps routes onto the storage operations and serves the storage tree
//! read-only for everything else.

pub mod handlers;
pub mod parser;
pub mod responses;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;

use crate::middleware::log_request;
use crate::server::state::AppState;

pub use handlers::{handle_delete, handle_health, handle_info, handle_list, handle_upload};

/// Room for multipart framing on top of the payload limit.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Builds the application router.
///
/// Explicit routes take precedence; any other path is served from the
/// storage root, so an object's URL path is its relative path.
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);
    let static_files = ServeDir::new(state.root.path());

    Router::new()
        .route("/health", get(handle_health))
        .route("/upload", post(handle_upload))
        .route("/files", get(handle_list).delete(handle_delete))
        .route("/files/info", get(handle_info))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
