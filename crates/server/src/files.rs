//! Source file API endpoints: upload, listing, ingest, parse errors.

use std::time::Duration;

use api_types::file::{
    FileListResponse, FileUpload, FileUploaded, FileView, IngestResponse, ParseErrorKind,
    ParseErrorListResponse, ParseErrorView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

/// Upper bound for one ingest pass; uploaded CSV size is unbounded.
const INGEST_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn upload(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FileUpload>,
) -> Result<(StatusCode, Json<FileUploaded>), ServerError> {
    let id = state
        .engine
        .upload_source_file(&user.username, &payload.filename, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(FileUploaded { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<FileListResponse>, ServerError> {
    let files = state
        .engine
        .list_source_files(&user.username)
        .await?
        .into_iter()
        .map(|file| FileView {
            id: file.id,
            filename: file.filename,
            uploaded_at: file.uploaded_at,
            processed_at: file.processed_at,
        })
        .collect();
    Ok(Json(FileListResponse { files }))
}

pub async fn ingest(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<IngestResponse>, ServerError> {
    let outcome = tokio::time::timeout(
        INGEST_TIMEOUT,
        state.engine.ingest(file_id, &user.username),
    )
    .await
    .map_err(|_| ServerError::Timeout)??;

    Ok(Json(IngestResponse {
        rows_inserted: outcome.rows_inserted,
        rows_failed: outcome.rows_failed,
    }))
}

pub async fn errors(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ParseErrorListResponse>, ServerError> {
    let errors = state
        .engine
        .parse_errors(file_id, &user.username)
        .await?
        .into_iter()
        .map(|error| ParseErrorView {
            row: error.row,
            column: error.column,
            kind: match error.kind.as_str() {
                engine::parse_errors::KIND_EMPTY_CELL => ParseErrorKind::EmptyCell,
                _ => ParseErrorKind::InvalidNumber,
            },
            message: error.message,
            raw_value: error.raw_value,
        })
        .collect();
    Ok(Json(ParseErrorListResponse { errors }))
}
