use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::scripts::{LineFormatError, ScriptError};
use crate::shared::constants::MSG_SCRIPT_NOT_FOUND;
use crate::shared::types::DetailResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Script error: {0}")]
    Script(String),
}

impl From<ScriptError> for AppError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::NotFound(script) => {
                tracing::error!("Script not found: {}", script);
                AppError::NotFound(MSG_SCRIPT_NOT_FOUND.to_string())
            }
            other => AppError::Script(other.to_string()),
        }
    }
}

impl From<LineFormatError> for AppError {
    fn from(err: LineFormatError) -> Self {
        AppError::Script(format!("Malformed script output: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("I/O error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::MissingParameter(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Script(ref msg) => {
                tracing::error!("Script error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error running script".to_string(),
                )
            }
        };

        (status, Json(DetailResponse::new(detail))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
