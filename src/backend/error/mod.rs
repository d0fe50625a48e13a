//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in HTTP handlers and can be converted to HTTP responses.
//!
//! # Architecture
//!
//! - **`types`** - Error type definitions and constructors
//! - **`conversion`** - `IntoResponse` implementation
//!
//! # Error Types
//!
//! - `HandlerError` - Errors raised by handlers with an explicit status
//! - `Unavailable` - No database configured (503)
//! - `Database` / `Store` - Persistence failures (500)
//! - `PasswordHash` / `Token` - Credential plumbing failures (500)
//! - `SharedError` - Validation errors from the shared module
//!
//! # Example
//!
//! ```rust,no_run
//! use discussion_board::backend::error::BackendError;
//! use axum::response::Response;
//!
//! # async fn example() -> Result<Response, BackendError> {
//! Err(BackendError::not_found("Discussion not found"))
//! # }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
