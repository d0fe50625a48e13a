//! Database operations for discussions
//!
//! This module contains the sqlx queries behind the discussion, participant
//! and comment routes, and behind `PgDiscussionStore`.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::shared::discussion::{
    AuthorSummary, Comment, DiscussionDetail, DiscussionSummary, Participant, ParticipantStatus,
};

const DISCUSSION_COLUMNS: &str = r#"
    SELECT d.id, d.title, d.created_at, d.updated_at, d.author_id, u.username AS author_username
    FROM discussions d
    JOIN users u ON u.id = d.author_id
"#;

const PARTICIPANT_COLUMNS: &str = r#"
    SELECT p.id, p.discussion_id, p.user_id, u.username, p.joined_at, p.status,
           p.last_active_at, p.is_author
    FROM participants p
    JOIN users u ON u.id = p.user_id
"#;

const COMMENT_COLUMNS: &str = r#"
    SELECT c.id, c.content, c.created_at, c.updated_at, c.discussion_id, c.participant_id,
           u.username AS author_username
    FROM comments c
    JOIN participants p ON p.id = c.participant_id
    JOIN users u ON u.id = p.user_id
"#;

fn discussion_from_row(row: &PgRow) -> Result<DiscussionSummary, sqlx::Error> {
    Ok(DiscussionSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        author: AuthorSummary {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
    })
}

fn participant_from_row(row: &PgRow) -> Result<Participant, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status =
        ParticipantStatus::from_str(&status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Participant {
        id: row.try_get("id")?,
        discussion_id: row.try_get("discussion_id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        joined_at: row.try_get("joined_at")?,
        status,
        last_active_at: row.try_get("last_active_at")?,
        is_author: row.try_get("is_author")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        discussion_id: row.try_get("discussion_id")?,
        participant_id: row.try_get("participant_id")?,
        author_username: row.try_get("author_username")?,
    })
}

/// All discussions, newest first
pub async fn list_discussions(pool: &PgPool) -> Result<Vec<DiscussionSummary>, sqlx::Error> {
    let query = format!("{} ORDER BY d.created_at DESC", DISCUSSION_COLUMNS);
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    rows.iter().map(discussion_from_row).collect()
}

/// Get a discussion by ID
pub async fn get_discussion(
    pool: &PgPool,
    discussion_id: Uuid,
) -> Result<Option<DiscussionSummary>, sqlx::Error> {
    let query = format!("{} WHERE d.id = $1", DISCUSSION_COLUMNS);
    let row = sqlx::query(&query)
        .bind(discussion_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(discussion_from_row).transpose()
}

/// Whether a discussion with exactly this title exists
pub async fn is_title_taken(pool: &PgPool, title: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM discussions WHERE title = $1) AS taken")
        .bind(title)
        .fetch_one(pool)
        .await?;
    row.try_get("taken")
}

/// Create a discussion and join its author as the first participant
pub async fn create_discussion(
    pool: &PgPool,
    title: &str,
    author_id: Uuid,
) -> Result<DiscussionSummary, sqlx::Error> {
    let discussion_id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO discussions (id, title, author_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        "#,
    )
    .bind(discussion_id)
    .bind(title)
    .bind(author_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO participants (id, discussion_id, user_id, joined_at, status, is_author)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(discussion_id)
    .bind(author_id)
    .bind(now)
    .bind(ParticipantStatus::Inactive.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_discussion(pool, discussion_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Delete a discussion; participants and comments cascade
pub async fn delete_discussion(pool: &PgPool, discussion_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM discussions WHERE id = $1")
        .bind(discussion_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Participants of a discussion in join order
pub async fn list_participants(
    pool: &PgPool,
    discussion_id: Uuid,
) -> Result<Vec<Participant>, sqlx::Error> {
    let query = format!(
        "{} WHERE p.discussion_id = $1 ORDER BY p.joined_at ASC",
        PARTICIPANT_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(discussion_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(participant_from_row).collect()
}

/// Participant by ID, scoped to a discussion
pub async fn find_participant(
    pool: &PgPool,
    discussion_id: Uuid,
    participant_id: Uuid,
) -> Result<Option<Participant>, sqlx::Error> {
    let query = format!(
        "{} WHERE p.discussion_id = $1 AND p.id = $2",
        PARTICIPANT_COLUMNS
    );
    let row = sqlx::query(&query)
        .bind(discussion_id)
        .bind(participant_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(participant_from_row).transpose()
}

/// Participant record of a user in a discussion
pub async fn find_participant_by_user(
    pool: &PgPool,
    discussion_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Participant>, sqlx::Error> {
    let query = format!(
        "{} WHERE p.discussion_id = $1 AND p.user_id = $2",
        PARTICIPANT_COLUMNS
    );
    let row = sqlx::query(&query)
        .bind(discussion_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(participant_from_row).transpose()
}

/// Join a user to a discussion as a regular participant
pub async fn add_participant(
    pool: &PgPool,
    discussion_id: Uuid,
    user_id: Uuid,
) -> Result<Participant, sqlx::Error> {
    let participant_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO participants (id, discussion_id, user_id, joined_at, status, is_author)
        VALUES ($1, $2, $3, $4, $5, FALSE)
        "#,
    )
    .bind(participant_id)
    .bind(discussion_id)
    .bind(user_id)
    .bind(Utc::now())
    .bind(ParticipantStatus::Inactive.as_str())
    .execute(pool)
    .await?;

    find_participant(pool, discussion_id, participant_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Remove a participant; their comments cascade
pub async fn remove_participant(pool: &PgPool, participant_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM participants WHERE id = $1")
        .bind(participant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Persist a participant's presence status
pub async fn set_participant_status(
    pool: &PgPool,
    participant_id: Uuid,
    status: ParticipantStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE participants SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(participant_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Bump a participant's last-active timestamp
pub async fn touch_participant_last_active(
    pool: &PgPool,
    participant_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE participants SET last_active_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(participant_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Comments of a discussion, oldest first
pub async fn list_comments(pool: &PgPool, discussion_id: Uuid) -> Result<Vec<Comment>, sqlx::Error> {
    let query = format!(
        "{} WHERE c.discussion_id = $1 ORDER BY c.created_at ASC",
        COMMENT_COLUMNS
    );
    let rows = sqlx::query(&query)
        .bind(discussion_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(comment_from_row).collect()
}

/// Comment by ID, scoped to a discussion
pub async fn get_comment(
    pool: &PgPool,
    discussion_id: Uuid,
    comment_id: Uuid,
) -> Result<Option<Comment>, sqlx::Error> {
    let query = format!(
        "{} WHERE c.discussion_id = $1 AND c.id = $2",
        COMMENT_COLUMNS
    );
    let row = sqlx::query(&query)
        .bind(discussion_id)
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(comment_from_row).transpose()
}

/// Post a comment and bump the discussion's `updated_at`
pub async fn add_comment(
    pool: &PgPool,
    discussion_id: Uuid,
    participant_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let comment_id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO comments (id, content, discussion_id, participant_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(comment_id)
    .bind(content)
    .bind(discussion_id)
    .bind(participant_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE discussions SET updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(discussion_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_comment(pool, discussion_id, comment_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Delete a comment
pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Full discussion detail: metadata, participants and comments
pub async fn discussion_detail(
    pool: &PgPool,
    discussion_id: Uuid,
) -> Result<Option<DiscussionDetail>, sqlx::Error> {
    let Some(discussion) = get_discussion(pool, discussion_id).await? else {
        return Ok(None);
    };
    let participants = list_participants(pool, discussion_id).await?;
    let comments = list_comments(pool, discussion_id).await?;

    Ok(Some(DiscussionDetail {
        id: discussion.id,
        title: discussion.title,
        created_at: discussion.created_at,
        updated_at: discussion.updated_at,
        author: discussion.author,
        participants,
        comments,
    }))
}
