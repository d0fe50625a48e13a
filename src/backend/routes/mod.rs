//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs                - Module exports and documentation
//! ├── router.rs             - Main router creation
//! ├── api_routes.rs         - Authentication and user routes
//! └── discussion_routes.rs  - Discussion, comment and WebSocket routes
//! ```
//!
//! # Route Organization
//!
//! 1. **API Routes** - registration, login, accounts, public profiles
//! 2. **Discussion Routes** - discussions, participants, comments, `/ws`
//! 3. **Static Files** - `/static` served from `STATIC_DIR`
//! 4. **Fallback Handler** - 404 as JSON
//!
//! Protected routes are grouped in their own router and guarded with
//! `route_layer(auth_middleware)`, so an unknown path still falls through to
//! the 404 fallback instead of answering 401.

/// Main router creation
pub mod router;

/// Authentication and user routes
pub mod api_routes;

/// Discussion routes
pub mod discussion_routes;

pub use router::create_router;
