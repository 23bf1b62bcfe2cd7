use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::files::dtos::{StoredFileDto, UploadQuery};
use crate::features::files::services::{FileService, UploadOutcome};
use crate::shared::constants::MSG_FILE_CREATED;
use crate::shared::types::DetailResponse;

/// Upload a file
///
/// The raw request body is stored under `filename`. A new file is
/// registered and answered with 201; overwriting an existing file answers 204.
#[utoipa::path(
    put,
    path = "/upload-file",
    tag = "files",
    params(UploadQuery),
    request_body(
        content = Vec<u8>,
        content_type = "application/octet-stream",
        description = "Raw file content",
    ),
    responses(
        (status = 201, description = "File created", body = DetailResponse),
        (status = 204, description = "Existing file replaced"),
        (status = 400, description = "Missing or invalid filename", body = DetailResponse),
        (status = 409, description = "Filename held by a soft-deleted record", body = DetailResponse),
        (status = 413, description = "Body too large")
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    AppQuery(query): AppQuery<UploadQuery>,
    body: Bytes,
) -> Result<Response, AppError> {
    match service.upload(query.filename.as_deref(), body).await? {
        UploadOutcome::Created(record) => {
            debug!("Upload registered as record {}", record.id);
            Ok((
                StatusCode::CREATED,
                Json(DetailResponse::new(MSG_FILE_CREATED)),
            )
                .into_response())
        }
        UploadOutcome::Replaced => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// List uploaded files
///
/// Alive files only, ordered by filename.
#[utoipa::path(
    get,
    path = "/list-files",
    tag = "files",
    responses(
        (status = 200, description = "Uploaded files", body = Vec<StoredFileDto>)
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<Vec<StoredFileDto>>, AppError> {
    let files = service.list_files().await?;

    Ok(Json(files.into_iter().map(StoredFileDto::from).collect()))
}
