/**
 * Current User Handlers
 *
 * Handlers operating on the authenticated user's own account:
 * - GET /api/auth/me
 * - DELETE /api/auth/me
 * - POST /api/auth/logout
 *
 * All three sit behind the auth middleware.
 */
use axum::{extract::State, http::StatusCode, response::Json};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::{delete_user, get_user_by_id};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;

pub async fn get_me(
    State(pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;

    let user = get_user_by_id(&pool, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    Ok(Json(UserResponse::from(&user)))
}

/// Delete the account along with everything it owns
pub async fn delete_me(
    State(pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;

    if !delete_user(&pool, user.user_id).await? {
        return Err(BackendError::not_found("User not found"));
    }

    tracing::info!("[Auth] Deleted account {} ({})", user.username, user.user_id);
    Ok(StatusCode::OK)
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(AuthUser(user): AuthUser) -> StatusCode {
    tracing::info!("[Auth] User logged out: {}", user.username);
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::middleware::AuthenticatedUser;
    use uuid::Uuid;

    fn auth_user() -> AuthUser {
        AuthUser(AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        })
    }

    #[tokio::test]
    async fn test_get_me_no_database() {
        let result = get_me(State(None), auth_user()).await;
        assert_eq!(result.unwrap_err().status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_logout_is_stateless() {
        assert_eq!(logout(auth_user()).await, StatusCode::OK);
    }
}
