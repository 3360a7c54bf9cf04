//! HTTP error mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use truthpulse_core::error::{RecordError, StoreError};

/// Errors returned by the HTTP handlers. Every variant renders a JSON body
/// with an `error` message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    NotFound(String),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("failed to read export: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::Record(RecordError::MissingContact) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "ok": false, "error": message })),
            )
                .into_response(),
            ApiError::InvalidBody(rejection) => {
                tracing::warn!("rejected request body: {message}");
                (
                    rejection.status(),
                    Json(json!({ "ok": false, "error": message })),
                )
                    .into_response()
            }
            ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Record(RecordError::Store(_)) | ApiError::Store(_) | ApiError::Io(_) => {
                tracing::error!("request failed: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}
