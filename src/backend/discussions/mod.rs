//! Discussions Module
//!
//! Discussions, their participants and comments.
//!
//! - **`db`** - sqlx queries against the discussions, participants and comments tables
//! - **`store`** - `PgDiscussionStore`, the realtime subsystem's view of the database
//! - **`handlers`** - discussion and participant REST handlers
//! - **`comments`** - comment REST handlers

pub mod db;

pub mod store;

pub mod handlers;

pub mod comments;

pub use store::PgDiscussionStore;
