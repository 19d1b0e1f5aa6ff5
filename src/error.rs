//! Error types for the PR labeler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// GitHub answered with a non-success status
    #[error("GitHub API error: {0}")]
    Upstream(String),

    /// Transport failure talking to GitHub
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Error response structure for API
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = match &self {
            AppError::Config(e) => ErrorResponse {
                status: "error",
                reason: "configuration_error".to_string(),
                details: Some(e.to_string()),
            },
            AppError::Validation(msg) => ErrorResponse {
                status: "rejected",
                reason: "validation_failed".to_string(),
                details: Some(msg.clone()),
            },
            AppError::Auth(msg) => ErrorResponse {
                status: "rejected",
                reason: "authentication_failed".to_string(),
                details: Some(msg.clone()),
            },
            AppError::Upstream(msg) => ErrorResponse {
                status: "error",
                reason: "upstream_error".to_string(),
                details: Some(msg.clone()),
            },
            AppError::Http(e) => ErrorResponse {
                status: "error",
                reason: "upstream_error".to_string(),
                details: Some(e.to_string()),
            },
        };

        // Log the error
        tracing::error!(
            error_type = %self,
            status_code = %status_code,
            "Request error"
        );

        (status_code, Json(json!(error_response))).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
