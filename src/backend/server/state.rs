/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The optional PostgreSQL pool
 * - The realtime hub (socket directory, heartbeat tracker, broadcaster)
 * - The loaded server configuration
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow handlers that only need the pool to
 * take `State<Option<PgPool>>` instead of the whole `AppState`.
 *
 * ```rust,ignore
 * async fn handler(State(pool): State<Option<PgPool>>) {
 *     let pool = pool.ok_or_else(BackendError::unavailable)?;
 *     // ...
 * }
 * ```
 */
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::realtime::{NotifyOutcome, RealtimeHub};
use crate::backend::server::config::ServerConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    ///
    /// This is `None` if `DATABASE_URL` is not set or the connection failed.
    /// Handlers answer 503 in that case.
    pub db_pool: Option<PgPool>,

    /// Realtime hub, present whenever a database is
    pub realtime: Option<RealtimeHub>,

    /// Configuration the server was started with
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db_pool: Option<PgPool>, realtime: Option<RealtimeHub>, config: ServerConfig) -> Self {
        Self {
            db_pool,
            realtime,
            config: Arc::new(config),
        }
    }

    /// The database pool, or 503 when none is configured
    pub fn pool(&self) -> Result<&PgPool, BackendError> {
        self.db_pool.as_ref().ok_or_else(|| {
            tracing::error!("[Server] Database not configured");
            BackendError::unavailable()
        })
    }

    /// Close the sockets `user_id` holds on `discussion_id`, if realtime is enabled
    pub fn disconnect(&self, discussion_id: Uuid, user_id: Uuid) -> usize {
        self.realtime
            .as_ref()
            .map_or(0, |hub| hub.disconnect_user(discussion_id, user_id))
    }

    /// Push the current state of a discussion to its subscribers
    ///
    /// Called after every successful mutation. Never fails the request.
    pub async fn notify(&self, discussion_id: Uuid) -> Option<NotifyOutcome> {
        match &self.realtime {
            Some(hub) => Some(hub.notify(discussion_id).await),
            None => None,
        }
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for Option<RealtimeHub> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime.clone()
    }
}
