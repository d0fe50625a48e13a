//! Authentication test helpers
//!
//! Provides utilities for generating tokens and authorization headers.

use uuid::Uuid;
use discussion_board::backend::auth::sessions::create_token;

/// Generate a test JWT token
pub fn generate_test_token(user_id: Uuid, username: &str) -> String {
    create_token(user_id, username).expect("Failed to generate test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
