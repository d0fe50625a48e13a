//! Backend Module
//!
//! This module contains all server-side code for the discussion board.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Authentication, JWT tokens, user management
//! - **`middleware`** - Request authentication
//! - **`discussions`** - Discussions, participants and comments
//! - **`realtime`** - WebSocket subscriptions, presence and broadcasting
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── discussions/    - Discussion persistence and handlers
//! ├── realtime/       - Live discussion updates
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the optional Postgres pool, the
//! `RealtimeHub` and the server configuration. Handlers that only need the
//! pool extract `State<Option<PgPool>>`.
//!
//! # Realtime Updates
//!
//! Each discussion has a registry of open WebSocket connections. After any
//! handler mutates a discussion it calls `AppState::notify`, which re-reads
//! the discussion and sends the snapshot to every connection. Heartbeats on
//! a socket mark the sender's participant active; a participant whose
//! heartbeats stop for the configured timeout, or whose socket closes, goes
//! back to inactive and everyone is notified.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`; `BackendError` renders itself
//! as a JSON body with the matching status code.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time update system
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Discussions, participants and comments
pub mod discussions;

pub use error::BackendError;
pub use realtime::RealtimeHub;
pub use server::create_app;
