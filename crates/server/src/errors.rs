use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error body for JSON endpoints: `{"title": ..., "detail": ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, title: title.into(), detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, title = %self.title, detail = ?self.detail, "request failed");
        }
        let body = serde_json::json!({"title": self.title, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation Error", Some(msg)),
            ServiceError::NotFound(what) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(what)),
            ServiceError::Conflict(msg) => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(msg)),
            ServiceError::Db(msg) => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Database Error", Some(msg)),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(err: AuthError) -> Self {
        let detail = Some(err.to_string());
        match err {
            AuthError::Validation(_) => JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation Error", detail),
            AuthError::Conflict => JsonApiError::new(StatusCode::CONFLICT, "Conflict", detail),
            AuthError::NotFound => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", detail),
            AuthError::Unauthorized => JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", detail),
            AuthError::InvalidVerificationLink => JsonApiError::new(StatusCode::FORBIDDEN, "Forbidden", detail),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                error!(code = err.code(), "auth failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error", detail)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
