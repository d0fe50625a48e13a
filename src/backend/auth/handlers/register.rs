/**
 * Register Handler
 *
 * This module implements the user registration handler for
 * POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate username format and password length
 * 2. Check that both passwords match
 * 3. Check the username is free
 * 4. Hash password using bcrypt
 * 5. Create user, generate JWT, return 201 with token and user
 */
use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, is_valid_username, username_exists};
use crate::backend::error::BackendError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check the request body before touching the database
pub fn validate_registration(request: &RegisterRequest) -> Result<(), BackendError> {
    if !is_valid_username(&request.username) {
        return Err(BackendError::bad_request(
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(BackendError::bad_request("Password must be at least 8 characters"));
    }

    if request.password != request.confirm_password {
        return Err(BackendError::bad_request("Passwords do not match"));
    }

    Ok(())
}

pub async fn register(
    State(pool): State<Option<PgPool>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    tracing::info!("[Auth] Register request for username: {}", request.username);

    validate_registration(&request).inspect_err(|e| {
        tracing::warn!("[Auth] Rejected registration for {}: {}", request.username, e.message());
    })?;

    if username_exists(&pool, &request.username).await? {
        tracing::warn!("[Auth] Username already exists: {}", request.username);
        return Err(BackendError::conflict("Username already taken"));
    }

    let password_hash = hash(&request.password, DEFAULT_COST)?;
    let user = create_user(&pool, &request.username, &password_hash).await?;
    let token = create_token(user.id, &user.username)?;

    tracing::info!("[Auth] User created: {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}
