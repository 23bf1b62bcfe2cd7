use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{list_files, upload_file};
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/upload-file",
            put(upload_file).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/list-files", get(list_files))
        .with_state(file_service)
}
