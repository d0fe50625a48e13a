//! Shared Error Types
//!
//! Failures that can happen while turning wire data into domain values and
//! back, independent of the HTTP layer.
//!
//! - `SerializationError` - a snapshot could not be encoded, or a payload decoded
//! - `ValidationError` - a value was well-formed JSON but not acceptable
//!
//! ```rust
//! use discussion_board::shared::error::SharedError;
//!
//! let error = SharedError::validation("status", "unknown participant status 'away'");
//! assert!(error.to_string().contains("status"));
//! ```
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("could not encode or decode payload: {message}")]
    SerializationError { message: String },

    /// `field` names the offending attribute as it appears on the wire
    #[error("invalid {field}: {message}")]
    ValidationError { field: String, message: String },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the caller sent something unacceptable, as opposed to an internal fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
