//! Error handlers
//!
//! Converts storage errors into HTTP responses at the request boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;

use crate::error::types::StorageError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

/// Log a storage error at a level matching its severity
pub fn handle_error(err: &StorageError) {
    match err {
        StorageError::Io(_) => error!("Storage error: {}", err),
        _ => warn!("Request rejected: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::NotAFile(_) => StatusCode::BAD_REQUEST,
        StorageError::NotADirectory(_) => StatusCode::BAD_REQUEST,
        StorageError::PathEscape(_) => StatusCode::FORBIDDEN,
        StorageError::NoFileProvided => StatusCode::BAD_REQUEST,
        StorageError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        handle_error(&self);

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.to_string(),
            },
        };

        (error_to_status(&self), Json(body)).into_response()
    }
}
