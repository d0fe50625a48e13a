/**
 * Comment Handlers
 *
 * - POST /api/discussions/{id}/comments/add?content=...
 * - DELETE /api/discussions/{id}/comments/delete/{comment_id}
 *
 * Only participants may comment. A comment can be deleted by whoever wrote
 * it or by the discussion's author. Both operations notify subscribers.
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::discussions::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::discussion::Comment;

#[derive(Deserialize, Debug, Default)]
pub struct CommentQuery {
    pub content: Option<String>,
}

/// Comment text with surrounding whitespace removed, or 400 when nothing is left
pub fn comment_content(query: &CommentQuery) -> Result<&str, BackendError> {
    match query.content.as_deref().map(str::trim) {
        Some(content) if !content.is_empty() => Ok(content),
        _ => Err(BackendError::bad_request("Comment content must not be empty")),
    }
}

pub async fn add_comment(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
    Query(query): Query<CommentQuery>,
) -> Result<(StatusCode, Json<Comment>), BackendError> {
    let content = comment_content(&query)?;
    let pool = app_state.pool()?;

    let participant = db::find_participant_by_user(pool, discussion_id, user.user_id)
        .await?
        .ok_or_else(|| BackendError::forbidden("Only participants can comment"))?;

    let comment = db::add_comment(pool, discussion_id, participant.id, content).await?;
    tracing::debug!(
        "[Discussions] {} commented on discussion {}",
        user.username,
        discussion_id
    );

    app_state.notify(discussion_id).await;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((discussion_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BackendError> {
    let pool = app_state.pool()?;

    let discussion = db::get_discussion(pool, discussion_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Discussion not found"))?;
    let comment = db::get_comment(pool, discussion_id, comment_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Comment not found"))?;

    let is_comment_author = db::find_participant(pool, discussion_id, comment.participant_id)
        .await?
        .is_some_and(|p| p.user_id == user.user_id);
    if !is_comment_author && discussion.author.id != user.user_id {
        return Err(BackendError::forbidden("Not allowed to delete this comment"));
    }

    db::delete_comment(pool, comment_id).await?;
    tracing::debug!(
        "[Discussions] {} deleted comment {} in discussion {}",
        user.username,
        comment_id,
        discussion_id
    );

    app_state.notify(discussion_id).await;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_trimmed() {
        let query = CommentQuery {
            content: Some("  hello  ".to_string()),
        };
        assert_eq!(comment_content(&query).unwrap(), "hello");
    }

    #[test]
    fn test_missing_or_blank_content_rejected() {
        assert!(comment_content(&CommentQuery::default()).is_err());
        let blank = CommentQuery {
            content: Some(" \n ".to_string()),
        };
        assert_eq!(
            comment_content(&blank).unwrap_err().status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
