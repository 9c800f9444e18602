use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assist::AssistError;
use crate::export::ExportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A second assist call for a key that is still pending.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Assist error: {0}")]
    Assist(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AssistError> for AppError {
    fn from(e: AssistError) -> Self {
        match e {
            AssistError::AlreadyPending(_) => AppError::Conflict(e.to_string()),
            AssistError::UnknownEntity(..) => AppError::NotFound(e.to_string()),
            other => AppError::Assist(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Assist(msg) => {
                tracing::error!("Assist error: {msg}");
                (StatusCode::BAD_GATEWAY, "ASSIST_ERROR", msg.clone())
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                let status = match e {
                    ExportError::CaptureUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, "EXPORT_ERROR", e.to_string())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::TaskKey;
    use crate::models::cv::EntitySection;

    #[test]
    fn test_assist_errors_map_to_statuses() {
        let conflict: AppError = AssistError::AlreadyPending(TaskKey::Skills).into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let missing: AppError =
            AssistError::UnknownEntity(EntitySection::Projects, "p9".to_string()).into();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let unavailable: AppError = AssistError::Unavailable.into();
        assert_eq!(unavailable.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_export_capture_unavailable_is_503() {
        let err = AppError::from(ExportError::CaptureUnavailable("no browser".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
