//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── register.rs - User registration handler
//! ├── login.rs    - User authentication handler
//! ├── me.rs       - Current user: get, delete, logout
//! └── account.rs  - Public checks and profiles
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`logout`** - POST /api/auth/logout
//! - **`get_me`** / **`delete_me`** - GET/DELETE /api/auth/me
//! - **`is_authenticated`** - GET /api/auth/is-authenticated
//! - **`is_username_taken`** - GET /api/auth/username-exists
//! - **`get_user`** - GET /api/users/{user_id}

pub mod types;

pub mod register;

pub mod login;

pub mod me;

pub mod account;

pub use types::{AuthResponse, LoginRequest, PublicProfile, RegisterRequest, UserResponse};

pub use account::{get_user, is_authenticated, is_username_taken};
pub use login::login;
pub use me::{delete_me, get_me, logout};
pub use register::register;
