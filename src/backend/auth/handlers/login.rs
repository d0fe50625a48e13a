/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Security
 *
 * - Passwords are verified using bcrypt
 * - Unknown users and wrong passwords both return 401
 * - User passwords are never returned in responses
 */
use axum::{extract::State, response::Json};
use bcrypt::verify;
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::get_user_by_username;
use crate::backend::error::BackendError;

pub async fn login(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    tracing::info!("[Auth] Login request for: {}", request.username);

    let user = get_user_by_username(&pool, &request.username)
        .await?
        .ok_or_else(|| {
            tracing::warn!("[Auth] User not found: {}", request.username);
            BackendError::unauthorized("User not found")
        })?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("[Auth] Invalid password for user: {}", request.username);
        return Err(BackendError::unauthorized("Incorrect password"));
    }

    let token = create_token(user.id, &user.username)?;

    tracing::info!("[Auth] User logged in: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_login_no_database() {
        let request = LoginRequest {
            username: "alice".to_string(),
            password: "password123".to_string(),
        };

        let result = login(State(None), Json(request)).await;
        assert_eq!(result.unwrap_err().status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
