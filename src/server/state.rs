//! Shared request state

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::protocol::parser::request_base_url;
use crate::server::config::ServerConfig;
use crate::storage::StorageRoot;

/// Everything a handler needs, cloned into each request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub root: StorageRoot,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(root: StorageRoot, config: ServerConfig) -> Self {
        Self {
            root,
            config: Arc::new(config),
        }
    }

    /// Base for object URLs as seen by the client that sent `headers`.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        request_base_url(
            headers,
            self.config.public_url.as_deref(),
            &self.config.socket_addr(),
        )
    }
}
