/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. API routes (auth, users)
 * 2. Discussion routes (REST + WebSocket)
 * 3. Static files
 * 4. Fallback handler (404)
 *
 * # CORS
 *
 * Browsers talk to the API from other origins during development, so every
 * origin, method and header is allowed.
 */
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::discussion_routes::configure_discussion_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state with the pool, realtime hub and config
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();

    let router = configure_api_routes(router, &app_state);
    let router = configure_discussion_routes(router, &app_state);

    // Add static file serving
    let router = router.nest_service("/static", ServeDir::new(&app_state.config.static_dir));

    // Fallback handler for 404
    let router = router.fallback(|| async { BackendError::not_found("Not found") });

    router.layer(CorsLayer::permissive()).with_state(app_state)
}
