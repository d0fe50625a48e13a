/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts and verifies the JWT and makes the
 * authenticated user available to handlers through the `AuthUser`
 * extractor.
 *
 * # Token Sources
 *
 * 1. `Authorization: Bearer <token>`
 * 2. `?token=<token>` query parameter, for WebSocket handshakes where
 *    browsers cannot set headers
 */
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// User attached to a request by `auth_middleware`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Pull the raw token out of the request head
pub fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        return header.strip_prefix("Bearer ").map(|t| t.trim().to_string());
    }

    parts.uri.query().and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "token")
            .map(|(_, value)| value.to_string())
    })
}

/// Verify the request's token and resolve the user
///
/// When a database is configured the user must still exist, so tokens of
/// deleted accounts stop working immediately.
pub async fn authenticate(app_state: &AppState, parts: &Parts) -> Result<AuthenticatedUser, BackendError> {
    let token = extract_token(parts).ok_or_else(|| {
        tracing::debug!("[Auth] Missing bearer token");
        BackendError::unauthorized("Missing authentication token")
    })?;

    let claims = verify_token(&token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| BackendError::unauthorized("Invalid token subject"))?;

    if let Some(pool) = &app_state.db_pool {
        if get_user_by_id(pool, user_id).await?.is_none() {
            tracing::warn!("[Auth] Token for unknown user {}", user_id);
            return Err(BackendError::unauthorized("User not found"));
        }
    }

    Ok(AuthenticatedUser {
        user_id,
        username: claims.username,
    })
}

/// Reject unauthenticated requests with 401
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let (mut parts, body) = request.into_parts();
    let user = authenticate(&app_state, &parts).await?;
    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Extractor for the user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Authentication required")
            })
    }
}
