//! Discussion Board - Main Library
//!
//! A discussion board API: users register, open discussions, join them and
//! comment. Every participant connected to a discussion over WebSocket gets
//! the discussion's full state pushed to them whenever it changes, and
//! heartbeats sent on that socket drive each participant's presence status.
//!
//! # Module Structure
//!
//! - **`shared`** - Types exchanged with clients
//!   - Discussion, participant and comment snapshots
//!   - WebSocket frames
//!   - Error types
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, routes and auth middleware
//!   - Postgres persistence through sqlx
//!   - Realtime subsystem: connection registries, heartbeat presence
//!     tracking and broadcast of discussion updates
//!
//! # Usage
//!
//! ```rust,no_run
//! use discussion_board::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Types shared with clients
pub mod shared;

/// Server-side code
pub mod backend;
