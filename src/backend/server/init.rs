/**
 * Server Initialization
 *
 * This module builds the Axum application: it opens the optional database,
 * wires the realtime hub over a Postgres-backed store, starts the periodic
 * registry sweep and assembles the router.
 *
 * # Error Handling
 *
 * The function is designed to be resilient:
 * - Missing database: the server starts and DB-backed routes answer 503
 * - Migration failures: logged but don't prevent startup
 */
use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::backend::discussions::PgDiscussionStore;
use crate::backend::realtime::RealtimeHub;
use crate::backend::routes::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing discussion board server");

    let db_pool = load_database(config.database_url.as_deref()).await;
    let app_state = build_state(db_pool, config);

    // detached: the sweep ends by itself once the last hub handle drops
    let _sweeper = start_background_tasks(&app_state);

    create_router(app_state)
}

/// Start the registry sweep when realtime updates are enabled
pub fn start_background_tasks(app_state: &AppState) -> Option<JoinHandle<()>> {
    let hub = app_state.realtime.as_ref()?;
    tracing::info!(
        "[Server] Registry sweep every {:?}, heartbeat timeout {:?}",
        hub.config().sweep_interval,
        hub.config().heartbeat_timeout
    );
    Some(hub.spawn_sweeper())
}

/// Assemble the application state around an optional pool
pub fn build_state(db_pool: Option<sqlx::PgPool>, config: ServerConfig) -> AppState {
    let realtime = db_pool.as_ref().map(|pool| {
        let store = Arc::new(PgDiscussionStore::new(pool.clone()));
        RealtimeHub::new(store, config.realtime())
    });

    if realtime.is_none() {
        tracing::warn!("[Server] Realtime updates disabled: no database");
    }

    AppState::new(db_pool, realtime, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::realtime::{InMemoryDiscussionStore, RealtimeConfig};
    use std::time::Duration;

    #[tokio::test]
    async fn test_no_sweeper_without_realtime() {
        let state = build_state(None, ServerConfig::default());
        assert!(start_background_tasks(&state).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_until_state_dropped() {
        let hub = RealtimeHub::new(Arc::new(InMemoryDiscussionStore::new()), RealtimeConfig::default());
        let state = AppState::new(None, Some(hub), ServerConfig::default());

        let sweeper = start_background_tasks(&state).unwrap();
        tokio::time::sleep(Duration::from_secs(900)).await;
        assert!(!sweeper.is_finished());

        drop(state);
        let finished = tokio::time::timeout(Duration::from_secs(900), sweeper).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }
}
