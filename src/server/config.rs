//! Configuration management for the RAX file store
//!
//! Values are layered: built-in defaults, then an optional `config.toml`,
//! then `RAX_STORE_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the HTTP listener binds to
    /// Environment: RAX_STORE_BIND_ADDRESS
    pub bind_address: String,

    /// HTTP port
    /// Environment: RAX_STORE_PORT
    pub port: u16,

    /// Storage root, relative paths resolve against the working directory
    /// Environment: RAX_STORE_STORAGE_ROOT
    pub storage_root: String,

    /// Maximum upload size in MB
    /// Environment: RAX_STORE_MAX_UPLOAD_SIZE_MB
    pub max_upload_size_mb: u64,

    /// Fixed base for object URLs. When unset the scheme and host of each
    /// request are used.
    /// Environment: RAX_STORE_PUBLIC_URL
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 9000,
            storage_root: "uploads".to_string(),
            max_upload_size_mb: 100,
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_root", defaults.storage_root)?
            .set_default("max_upload_size_mb", defaults.max_upload_size_mb as i64)?
            // Docker production path first, then local development
            .add_source(File::with_name("rax-file-store/config").required(false))
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("RAX_STORE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        if let Some(url) = &self.public_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Message(format!(
                    "public_url must start with http:// or https://, got {url}"
                )));
            }
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}
