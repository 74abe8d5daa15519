//! Server core
//!
//! Opens the storage root, binds the listener and runs the HTTP service
//! until shutdown.

use log::{error, info, warn};
use std::io;
use tokio::net::TcpListener;

use crate::protocol::router;
use crate::server::config::ServerConfig;
use crate::server::state::AppState;
use crate::storage::StorageRoot;

pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Opens the storage root and binds the listener.
    pub async fn new(config: ServerConfig) -> io::Result<Self> {
        let root = StorageRoot::open(config.storage_root_path()).map_err(|e| {
            error!(
                "Failed to prepare storage root {}: {}",
                config.storage_root, e
            );
            e
        })?;

        let socket = config.socket_addr();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        Ok(Self {
            listener,
            state: AppState::new(root, config),
        })
    }

    /// Serves requests until Ctrl-C.
    pub async fn start(self) -> io::Result<()> {
        info!(
            "Starting RAX file store on {} (storage root {}, max upload {} MB)",
            self.state.config.socket_addr(),
            self.state.root.path().display(),
            self.state.config.max_upload_size_mb
        );

        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, draining connections"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
