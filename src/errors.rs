use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Client-facing failure categories shared by both services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A downstream collaborator could not be reached.
    TransportUnavailable,
    /// Entity absent, or owned by another client.
    NotFound,
    /// Downstream accepted the request but did not store it.
    PersistenceFailure,
    ValidationFailure,
    PayloadTooLarge,
    UnexpectedFailure,
}

impl FailureKind {
    pub fn status(self) -> StatusCode {
        match self {
            FailureKind::TransportUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::ValidationFailure => StatusCode::UNPROCESSABLE_ENTITY,
            FailureKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            FailureKind::PersistenceFailure | FailureKind::UnexpectedFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn from_kind(kind: FailureKind, msg: impl Into<String>) -> Self {
        Self::new(kind.status(), msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}
