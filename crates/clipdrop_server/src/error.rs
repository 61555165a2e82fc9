//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by handlers; renders as `{"error": message}`.
#[derive(Debug)]
pub enum HttpError {
    /// Domain or storage failure from the core.
    App(AppError),
    /// Missing or wrong cleanup secret.
    Unauthorized,
    /// Body that is not JSON, or JSON of the wrong shape.
    MalformedBody(String),
    /// Body the JSON extractor refused outright (wrong content type, too large).
    Rejected(JsonRejection),
}

impl From<JsonRejection> for HttpError {
    fn from(value: JsonRejection) -> Self {
        Self::Rejected(value)
    }
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl HttpError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Self::MalformedBody(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            Self::Rejected(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            Self::Rejected(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            Self::App(err) if err.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::App(AppError::NotFound) => (StatusCode::NOT_FOUND, "Not found".to_string()),
            Self::App(AppError::StorageUnavailable(detail)) => {
                tracing::warn!("Storage unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage temporarily unavailable".to_string(),
                )
            }
            Self::App(err) => {
                tracing::error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
