/**
 * Discussion Handlers
 *
 * REST handlers for discussions and their participants. Every handler that
 * changes what a discussion's detail looks like pushes a fresh snapshot to
 * its WebSocket subscribers through `AppState::notify` once the write has
 * succeeded.
 *
 * # Access
 *
 * Listing and title checks are public. Everything else runs behind the auth
 * middleware; reading a discussion's detail additionally requires being one
 * of its participants.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::discussions::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::discussion::{DiscussionDetail, DiscussionSummary, Participant};

/// Longest title accepted on create
pub const MAX_TITLE_LEN: usize = 200;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TitleTakenResponse {
    pub taken: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IsParticipantResponse {
    pub is_participant: bool,
}

/// Trimmed title, or 400 when it is empty or too long
pub fn validate_title(title: &str) -> Result<&str, BackendError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BackendError::bad_request("Title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(BackendError::bad_request("Title is too long"));
    }
    Ok(title)
}

pub async fn list_discussions(
    State(pool): State<Option<PgPool>>,
) -> Result<Json<Vec<DiscussionSummary>>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    let discussions = db::list_discussions(&pool).await?;
    Ok(Json(discussions))
}

pub async fn is_title_taken(
    State(pool): State<Option<PgPool>>,
    Path(title): Path<String>,
) -> Result<Json<TitleTakenResponse>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    let taken = db::is_title_taken(&pool, title.trim()).await?;
    Ok(Json(TitleTakenResponse { taken }))
}

pub async fn create_discussion(
    State(pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
    Path(title): Path<String>,
) -> Result<(StatusCode, Json<DiscussionSummary>), BackendError> {
    let title = validate_title(&title)?;
    let pool = pool.ok_or_else(BackendError::unavailable)?;

    if db::is_title_taken(&pool, title).await? {
        return Err(BackendError::conflict("A discussion with this title already exists"));
    }

    let discussion = db::create_discussion(&pool, title, user.user_id).await?;
    tracing::info!(
        "[Discussions] {} created discussion '{}' ({})",
        user.username,
        discussion.title,
        discussion.id
    );

    Ok((StatusCode::CREATED, Json(discussion)))
}

/// Only the author may delete; participants and comments go with it
///
/// Subscribers receive nothing: the snapshot no longer exists.
pub async fn delete_discussion(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let pool = app_state.pool()?;

    let discussion = db::get_discussion(pool, discussion_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Discussion not found"))?;

    if discussion.author.id != user.user_id {
        return Err(BackendError::forbidden("Only the author can delete a discussion"));
    }

    db::delete_discussion(pool, discussion_id).await?;
    tracing::info!("[Discussions] Deleted discussion {}", discussion_id);

    app_state.notify(discussion_id).await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn join_discussion(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Participant>), BackendError> {
    let pool = app_state.pool()?;

    if db::get_discussion(pool, discussion_id).await?.is_none() {
        return Err(BackendError::not_found("Discussion not found"));
    }

    if db::find_participant_by_user(pool, discussion_id, user.user_id)
        .await?
        .is_some()
    {
        return Err(BackendError::bad_request("Already a participant of this discussion"));
    }

    let participant = db::add_participant(pool, discussion_id, user.user_id).await?;
    tracing::info!(
        "[Discussions] {} joined discussion {}",
        user.username,
        discussion_id
    );

    app_state.notify(discussion_id).await;

    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn leave_discussion(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let pool = app_state.pool()?;

    let participant = db::find_participant_by_user(pool, discussion_id, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not a participant of this discussion"))?;

    db::remove_participant(pool, participant.id).await?;
    let closed = app_state.disconnect(discussion_id, user.user_id);
    tracing::info!(
        "[Discussions] {} left discussion {} ({} socket(s) closed)",
        user.username,
        discussion_id,
        closed
    );

    app_state.notify(discussion_id).await;

    Ok(StatusCode::OK)
}

pub async fn discussion_details(
    State(pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
) -> Result<Json<DiscussionDetail>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;

    let detail = db::discussion_detail(&pool, discussion_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Discussion not found"))?;

    if !detail.has_user(user.user_id) {
        return Err(BackendError::unauthorized("Only participants can view this discussion"));
    }

    Ok(Json(detail))
}

pub async fn is_participant(
    State(pool): State<Option<PgPool>>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
) -> Result<Json<IsParticipantResponse>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    let participant = db::find_participant_by_user(&pool, discussion_id, user.user_id).await?;
    Ok(Json(IsParticipantResponse {
        is_participant: participant.is_some(),
    }))
}

pub async fn get_participant(
    State(pool): State<Option<PgPool>>,
    Path((discussion_id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Participant>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    db::find_participant(&pool, discussion_id, participant_id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Participant not found"))
}

pub async fn get_participant_by_user(
    State(pool): State<Option<PgPool>>,
    Path((discussion_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Participant>, BackendError> {
    let pool = pool.ok_or_else(BackendError::unavailable)?;
    db::find_participant_by_user(&pool, discussion_id, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("Participant not found"))
}
