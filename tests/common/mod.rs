//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Realtime fixtures over the in-memory store
//! - Authentication test helpers
//! - Router request helpers

pub mod auth_helpers;
pub mod fixtures;
pub mod http;

// Re-export commonly used utilities
pub use auth_helpers::*;
pub use fixtures::*;
pub use http::*;
