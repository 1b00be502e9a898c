use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders the same envelope as a successful response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed: {0:?}")]
    ValidationFailed(Vec<String>),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Role or ownership violation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing or malformed bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bearer token past its expiry.
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,

    /// Verification link expired; a fresh one has been emailed.
    #[error("Verification token expired")]
    VerificationExpired,

    #[error("Email already verified")]
    AlreadyVerified,

    #[error("Invalid verification token")]
    InvalidToken,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::ValidationFailed(_)
            | AppError::InvalidTransition { .. }
            | AppError::VerificationExpired
            | AppError::AlreadyVerified
            | AppError::InvalidToken
            | AppError::PayloadTooLarge => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) | AppError::EmailNotVerified => StatusCode::FORBIDDEN,
            AppError::Unauthorized | AppError::TokenExpired | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message and error list. Internal detail never leaves the process.
    fn message_and_errors(&self) -> (String, Vec<String>) {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg) => (msg.clone(), vec![msg.clone()]),
            AppError::ValidationFailed(errors) => ("Validation failed".to_string(), errors.clone()),
            AppError::InvalidTransition { from, to } => {
                let msg = format!("Invalid status transition from {from} to {to}");
                (msg.clone(), vec![msg])
            }
            AppError::Unauthorized => (
                "Authentication required".to_string(),
                vec!["Missing or invalid bearer token".to_string()],
            ),
            AppError::TokenExpired => (
                "Token expired".to_string(),
                vec!["Please login again".to_string()],
            ),
            AppError::InvalidCredentials => (
                "Invalid credentials".to_string(),
                vec!["Authentication failed".to_string()],
            ),
            AppError::EmailNotVerified => {
                let msg = "Please verify your email before logging in".to_string();
                (msg.clone(), vec![msg])
            }
            AppError::VerificationExpired => {
                let msg = "Token expired. New verification email sent".to_string();
                (msg.clone(), vec![msg])
            }
            AppError::AlreadyVerified => {
                let msg = "Email has already been verified".to_string();
                (msg.clone(), vec![msg])
            }
            AppError::InvalidToken => {
                let msg = "Invalid or malformed token".to_string();
                (msg.clone(), vec![msg])
            }
            AppError::PayloadTooLarge => (
                "File size exceeded".to_string(),
                vec!["Maximum file size is 5MB".to_string()],
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                internal()
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                internal()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                internal()
            }
        }
    }
}

fn internal() -> (String, Vec<String>) {
    (
        "Internal server error".to_string(),
        vec!["An unexpected error occurred".to_string()],
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = self.message_and_errors();
        if status.is_client_error() {
            tracing::debug!("Request rejected ({status}): {message}");
        }

        (status, Json(ApiResponse::<()>::error(message, errors))).into_response()
    }
}
