/**
 * Public Account Handlers
 *
 * - GET /api/auth/is-authenticated - `true`/200 or `false`/401
 * - GET /api/auth/username-exists?username= - availability check for sign-up forms
 * - GET /api/users/{user_id} - public profile
 *
 * None of these go through the auth middleware.
 */
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::handlers::types::{PublicProfile, UsernameExistsResponse, UsernameQuery};
use crate::backend::auth::users::{get_user_by_id, username_exists};
use crate::backend::error::BackendError;
use crate::backend::middleware::authenticate;
use crate::backend::server::state::AppState;

pub async fn is_authenticated(
    State(app_state): State<AppState>,
    request: Request,
) -> (StatusCode, &'static str) {
    let (parts, _body) = request.into_parts();
    match authenticate(&app_state, &parts).await {
        Ok(_) => (StatusCode::OK, "true"),
        Err(_) => (StatusCode::UNAUTHORIZED, "false"),
    }
}

pub async fn is_username_taken(
    State(pool): State<Option<PgPool>>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<UsernameExistsResponse>, BackendError> {
    let username = query
        .username
        .ok_or_else(|| BackendError::bad_request("username is missing"))?;
    if username.is_empty() {
        return Err(BackendError::bad_request("username is empty"));
    }

    let pool = pool.ok_or_else(BackendError::unavailable)?;
    let exists = username_exists(&pool, &username).await?;

    Ok(Json(UsernameExistsResponse { exists }))
}

pub async fn get_user(
    State(pool): State<Option<PgPool>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicProfile>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;

    let user = get_user_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    Ok(Json(PublicProfile::from(user)))
}
