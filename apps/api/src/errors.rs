use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ingest::IngestError;
use crate::model_client::ModelError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every failure is terminal for the current request — there are no partial
/// results; the client must re-trigger the action.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No resume was uploaded")]
    MissingUpload,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingUpload => AppError::MissingUpload,
            IngestError::MalformedDocument(msg) => AppError::MalformedDocument(msg),
            IngestError::Backend(msg) | IngestError::Encode(msg) => {
                AppError::Internal(anyhow::anyhow!(msg))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingUpload => (
                StatusCode::BAD_REQUEST,
                "MISSING_UPLOAD",
                "Please upload a resume PDF before requesting an evaluation".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MalformedDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MALFORMED_DOCUMENT",
                format!("The uploaded file could not be read as a PDF: {msg}"),
            ),
            AppError::Model(ModelError::Blocked { reason }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONTENT_BLOCKED",
                format!("The model declined to evaluate this request ({reason})"),
            ),
            AppError::Model(e) => {
                tracing::error!("Model error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_ERROR",
                    "The evaluation service failed to respond".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
