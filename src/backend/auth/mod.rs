//! Authentication Module
//!
//! This module handles user registration, login and token-based sessions.
//!
//! # Architecture
//!
//! - **`users`** - User data model and database operations
//! - **`sessions`** - JWT token generation and validation
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register**: username + password twice → user created → JWT returned (201)
//! 2. **Login**: username + password → credentials verified → JWT returned
//! 3. **Protected routes**: JWT in `Authorization: Bearer` (or `?token=` for
//!    WebSockets) → verified by `middleware::auth_middleware`
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens are used for stateless authentication
//! - Tokens expire after 7 days
//! - Invalid credentials return 401

pub mod users;

pub mod sessions;

pub mod handlers;

pub use handlers::{
    delete_me, get_me, get_user, is_authenticated, is_username_taken, login, logout, register,
};
