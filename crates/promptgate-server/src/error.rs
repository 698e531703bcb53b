//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use promptgate_backend::BackendError;
use promptgate_templates::TemplateError;
use serde_json::json;
use std::fmt;

/// Server error type
#[derive(Debug)]
pub enum ServerError {
    /// Missing or wrong bearer token
    Unauthorized,

    /// Invalid request
    InvalidRequest(String),

    /// Not found
    NotFound(String),

    /// Prompt template failed to render
    TemplateError(String),

    /// Backend call failed (unreachable, timed out, error status)
    BackendError(String),

    /// Internal server error
    InternalError(String),
}

impl ServerError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::TemplateError(_)
            | ServerError::BackendError(_)
            | ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Unauthorized => write!(f, "Unauthorized"),
            ServerError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::TemplateError(msg) => write!(f, "Template error: {}", msg),
            ServerError::BackendError(msg) => write!(f, "Backend error: {}", msg),
            ServerError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<TemplateError> for ServerError {
    fn from(err: TemplateError) -> Self {
        ServerError::TemplateError(err.to_string())
    }
}

impl From<BackendError> for ServerError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Serialization(_) | BackendError::Decode(_) => {
                ServerError::InternalError(err.to_string())
            }
            _ => ServerError::BackendError(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}
