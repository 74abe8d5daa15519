//! RAX File Store - Entry Point
//!
//! A networked file store: uploads land in a managed directory tree and can
//! be listed, inspected, fetched and deleted by path.

use log::{error, info};
use std::process::ExitCode;

use rax_file_store::Server;
use rax_file_store::ServerConfig;
use rax_file_store::utils::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching file store...");

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped with error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
