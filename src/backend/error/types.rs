/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. Every
 * variant maps to a status code and converts into a JSON response (see
 * `conversion.rs`).
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Raised directly by handlers with an explicit status: missing resources,
 * failed permission checks, invalid input, duplicate usernames.
 *
 * ## Storage Errors
 *
 * Database failures from sqlx, either directly or through the discussion
 * store. These are logged and reported as 500 without leaking details.
 *
 * ## Shared Errors
 *
 * Validation and serialization errors from the shared wire types.
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::realtime::store::StoreError;
use crate::shared::SharedError;

/// Backend error types
///
/// # Example
///
/// ```rust
/// use discussion_board::backend::error::BackendError;
///
/// let error = BackendError::not_found("Discussion not found");
/// assert_eq!(error.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error with an explicit HTTP status
    #[error("Handler error: {message}")]
    HandlerError {
        status: StatusCode,
        message: String,
    },

    /// Database is not configured for this server
    #[error("Database not configured")]
    Unavailable,

    /// Query failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure inside the discussion store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Token signing failure
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a handler error with the given status
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::CONFLICT, message)
    }

    /// The database pool is missing
    pub fn unavailable() -> Self {
        Self::Unavailable
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_)
            | Self::Store(_)
            | Self::PasswordHash(_)
            | Self::Token(_)
            | Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::SharedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients
    ///
    /// Internal failures are reduced to a generic message; the details are
    /// logged when the response is built.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unavailable => "Database not configured".to_string(),
            Self::SharedError(SharedError::ValidationError { message, .. }) => message.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}
