//! Shared Module
//!
//! This module contains the types exchanged between the server and its
//! clients: discussion snapshots returned by the REST API, and the frames
//! sent over a discussion's WebSocket.
//!
//! # Overview
//!
//! The shared module has no dependency on Axum or sqlx. Everything here is
//! plain data designed for JSON serialization.

/// Discussion, participant and comment types
pub mod discussion;

/// WebSocket frame types
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use discussion::{
    AuthorSummary, Comment, DiscussionDetail, DiscussionSummary, Participant, ParticipantStatus,
};
pub use error::SharedError;
pub use event::{ClientFrame, DiscussionUpdate, FrameError};
