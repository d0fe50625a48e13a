/**
 * API Route Handlers
 *
 * This module defines routes for authentication and user endpoints.
 *
 * # Routes
 *
 * ## Public
 * - `POST /api/auth/register` - User registration
 * - `POST /api/auth/login` - User login
 * - `GET /api/auth/is-authenticated` - Token check
 * - `GET /api/auth/username-exists` - Username availability
 * - `GET /api/users/{user_id}` - Public profile
 *
 * ## Authenticated
 * - `POST /api/auth/logout` - Logout
 * - `GET /api/auth/me` - Current user
 * - `DELETE /api/auth/me` - Delete the current account
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{
    delete_me, get_me, get_user, is_authenticated, is_username_taken, login, logout, register,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `app_state` - State handed to the auth middleware
///
/// # Returns
///
/// Router with API routes configured
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me).delete(delete_me))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/is-authenticated", get(is_authenticated))
        .route("/api/auth/username-exists", get(is_username_taken))
        .route("/api/users/{user_id}", get(get_user))
        .merge(protected)
}
