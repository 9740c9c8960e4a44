use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;

/// Body sent for every internal failure; callers never see the cause.
pub const INTERNAL_ERROR_BODY: &str = "Error processing webhook";

/// Body sent when the push notification has no pusher name.
pub const INVALID_PAYLOAD_BODY: &str = "Invalid payload";

/// Custom error type for auto_deploy_trigger operations
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Git operation failed: {operation}\n{message}")]
    GitSyncFailure { operation: String, message: String },

    #[error("Deployment log write failed: {0}")]
    FilesystemFailure(#[from] io::Error),

    #[error("Unexpected failure: {0}")]
    UnknownFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DeployError {
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        DeployError::GitSyncFailure {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DeployError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Causes are only ever logged; the response body never carries them.
impl IntoResponse for DeployError {
    fn into_response(self) -> Response {
        let body = match self {
            DeployError::InvalidPayload(_) => INVALID_PAYLOAD_BODY,
            _ => INTERNAL_ERROR_BODY,
        };
        (self.status_code(), body).into_response()
    }
}

/// Helper type for Results that use DeployError
pub type Result<T> = std::result::Result<T, DeployError>;
