//! Response bodies
//!
//! Storage results serialize directly; only the health check needs its own
//! body.

use serde::Serialize;

/// Static liveness acknowledgment.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
        }
    }
}
