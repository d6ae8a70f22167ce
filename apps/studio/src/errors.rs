use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editor::EditorError;
use crate::enhance::{EnhanceError, ENHANCE_FAILED_MESSAGE};
use crate::export::ExportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Enhancement error: {0}")]
    Enhance(#[from] EnhanceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Editor(e) => {
                let (status, code) = match e {
                    EditorError::EntryNotFound { .. } => (StatusCode::NOT_FOUND, "ENTRY_NOT_FOUND"),
                    EditorError::SkillIndexOutOfRange { .. } => {
                        (StatusCode::NOT_FOUND, "SKILL_NOT_FOUND")
                    }
                    EditorError::PhotoTooLarge { .. } => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "PHOTO_TOO_LARGE")
                    }
                    EditorError::UnsupportedPhotoType => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_PHOTO_TYPE")
                    }
                    EditorError::EmptySkill
                    | EditorError::InvalidEntry { .. }
                    | EditorError::EmptyPhoto => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                };
                (status, code, e.to_string())
            }
            AppError::Export(e) => {
                // The pipeline has already logged the cause.
                let (status, code) = match e {
                    ExportError::SurfaceNotFound(_) => (StatusCode::NOT_FOUND, "EXPORT_FAILED"),
                    ExportError::AlreadyInProgress(_) => {
                        (StatusCode::CONFLICT, "EXPORT_IN_PROGRESS")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED"),
                };
                (status, code, e.user_message().to_string())
            }
            AppError::Enhance(e) => {
                let (status, code) = match e {
                    EnhanceError::EmptyText => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    EnhanceError::Unavailable => {
                        (StatusCode::SERVICE_UNAVAILABLE, "ENHANCE_UNAVAILABLE")
                    }
                    EnhanceError::Llm(_) | EnhanceError::EmptyRewrite => {
                        tracing::error!("Enhancement error: {e}");
                        (StatusCode::BAD_GATEWAY, "ENHANCE_FAILED")
                    }
                };
                let message = match e {
                    EnhanceError::EmptyText => e.to_string(),
                    _ => ENHANCE_FAILED_MESSAGE.to_string(),
                };
                (status, code, message)
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
