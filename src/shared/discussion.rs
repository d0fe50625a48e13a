/**
 * Discussion Data Structures
 *
 * This module defines the discussion, participant and comment types that are
 * returned by the REST API and pushed to WebSocket subscribers.
 *
 * # Serialization
 *
 * All types serialize with camelCase field names, matching what the browser
 * client expects. Timestamps are RFC 3339 strings via chrono's serde support.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Presence status of a participant
///
/// Only the heartbeat tracker moves a participant between these states;
/// a freshly joined participant starts as `Inactive`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Active,
    #[default]
    Inactive,
}

impl ParticipantStatus {
    /// Database representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Active => "active",
            ParticipantStatus::Inactive => "inactive",
        }
    }

    /// Parse the database representation of the status
    pub fn from_str(value: &str) -> Result<Self, SharedError> {
        match value {
            "active" => Ok(ParticipantStatus::Active),
            "inactive" => Ok(ParticipantStatus::Inactive),
            other => Err(SharedError::validation(
                "status",
                format!("unknown participant status '{}'", other),
            )),
        }
    }
}

/// Public author information attached to a discussion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

/// Discussion as listed by `GET /api/discussions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

/// A user's membership in one discussion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub discussion_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub status: ParticipantStatus,
    pub last_active_at: Option<DateTime<Utc>>,
    pub is_author: bool,
}

/// A comment posted by a participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub discussion_id: Uuid,
    pub participant_id: Uuid,
    pub author_username: String,
}

/// Full discussion state: metadata, participants and comments
///
/// This is what `GET /api/discussions/{id}/details` returns and what every
/// `discussion-update` frame carries. Clients treat it as a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionDetail {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorSummary,
    pub participants: Vec<Participant>,
    pub comments: Vec<Comment>,
}

impl DiscussionDetail {
    /// Look up a participant of this discussion by participant id
    pub fn participant(&self, participant_id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Whether the given user is a participant of this discussion
    pub fn has_user(&self, user_id: Uuid) -> bool {
        self.participants.iter().any(|p| p.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_database_text() {
        assert_eq!(ParticipantStatus::from_str("active").unwrap(), ParticipantStatus::Active);
        assert_eq!(ParticipantStatus::Inactive.as_str(), "inactive");
        assert!(ParticipantStatus::from_str("away").is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ParticipantStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }

    #[test]
    fn test_participant_uses_camel_case() {
        let participant = Participant {
            id: Uuid::new_v4(),
            discussion_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            joined_at: Utc::now(),
            status: ParticipantStatus::default(),
            last_active_at: None,
            is_author: true,
        };
        let value = serde_json::to_value(&participant).unwrap();
        assert_eq!(value["isAuthor"], true);
        assert_eq!(value["status"], "inactive");
        assert!(value.get("lastActiveAt").is_some());
    }
}
