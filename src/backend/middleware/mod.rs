//! Middleware Module
//!
//! This module contains the HTTP middleware of the backend server.
//!
//! - **`auth`** - JWT authentication for protected routes
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use discussion_board::backend::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/api/auth/me", get(get_me))
//!     .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));
//! ```

pub mod auth;

pub use auth::{auth_middleware, authenticate, extract_token, AuthUser, AuthenticatedUser};
