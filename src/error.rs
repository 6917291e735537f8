use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Store(StoreError::RemoteWriteFailed(e)) => {
                tracing::error!(error = %e, "Remote write failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Could not save your changes. Check your connection and try again.".into(),
                )
            }
            AppError::Store(StoreError::RemoteUnavailable(e)) => {
                tracing::warn!(error = %e, "Remote store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Journal service is unreachable".into(),
                )
            }
            AppError::Store(StoreError::BlobUnavailable(e)) => {
                tracing::error!(error = %e, "Blob storage failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Could not upload the photo. Please try again.".into(),
                )
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "Local cache error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
