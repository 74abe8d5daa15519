//! Request handlers for the RAX file store.
//!
//! Each handler resolves its input once, runs the storage operation and
//! returns either the JSON result or a [`StorageError`], which renders itself
//! as a structured error response.

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use log::{info, warn};

use crate::error::{Result, StorageError};
use crate::protocol::parser::{ListQuery, PathQuery, UploadFields, UploadQuery};
use crate::protocol::responses::HealthResponse;
use crate::server::state::AppState;
use crate::storage::{self, DeleteResult, ListResult, ObjectRecord, StoreResult};
use crate::transfer::handle_file_upload;
use crate::utils::run_blocking;

/// `POST /upload`: stores the first file part of a multipart body.
///
/// Text parts (`directory`/`folder`, `filename`/`name`) must precede the file
/// part to apply; they take precedence over the same keys in the query
/// string.
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<StoreResult>> {
    let query_fields = UploadFields::from_query(&query);
    let mut body_fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let field_name = field.name().unwrap_or_default().to_string();

        let Some(original_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(invalid_multipart)?;
            if !body_fields.set_field(&field_name, value) {
                warn!("Ignoring unknown upload field {:?}", field_name);
            }
            continue;
        };

        let target = UploadFields::resolve(&body_fields, &query_fields, &original_name);
        info!(
            "Upload request: directory={:?}, name={:?}, original={:?}",
            target.directory, target.desired_name, target.original_name
        );

        let result = handle_file_upload(
            &state.root,
            target,
            field,
            state.config.max_upload_size_bytes(),
            &state.base_url(&headers),
        )
        .await?;

        return Ok(Json(result));
    }

    Err(StorageError::NoFileProvided)
}

/// `GET /files?directory=`: lists the immediate children of a directory.
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<ListResult>> {
    let base_url = state.base_url(&headers);
    let directory = query.directory().to_string();
    let root = state.root.clone();

    let listing =
        run_blocking(move || storage::list_directory(&root, &directory, &base_url)).await?;
    Ok(Json(listing))
}

/// `GET /files/info?path=`: metadata of one file or directory.
pub async fn handle_info(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Json<ObjectRecord>> {
    let base_url = state.base_url(&headers);
    let root = state.root.clone();

    let record = run_blocking(move || storage::object_info(&root, &query.path, &base_url)).await?;
    Ok(Json(record))
}

/// `DELETE /files?path=`: removes one file.
pub async fn handle_delete(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<DeleteResult>> {
    let root = state.root.clone();

    let deleted = run_blocking(move || storage::delete_file(&root, &query.path)).await?;
    Ok(Json(deleted))
}

/// `GET /health`
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> StorageError {
    StorageError::InvalidRequest(err.body_text())
}
