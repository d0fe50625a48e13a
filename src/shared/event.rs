/**
 * Real-time Frame Types
 *
 * This module defines the JSON frames exchanged over a discussion's
 * WebSocket connection.
 *
 * # Inbound
 *
 * Clients send heartbeat frames to prove a participant is still present:
 *
 * ```json
 * {"type": "heartbeat", "participantId": "<uuid>"}
 * ```
 *
 * # Outbound
 *
 * The server pushes the full discussion detail with an added type tag:
 *
 * ```json
 * {"type": "discussion-update", "id": "...", "title": "...", "participants": [], "comments": []}
 * ```
 */
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::discussion::DiscussionDetail;
use crate::shared::error::SharedError;

/// Type tag of outbound discussion snapshots
pub const DISCUSSION_UPDATE: &str = "discussion-update";

/// Type tag of inbound heartbeat frames
pub const HEARTBEAT: &str = "heartbeat";

/// A recognised inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFrame {
    /// Liveness signal for one participant
    Heartbeat { participant_id: Uuid },
}

/// Why an inbound frame was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is not a JSON object")]
    NotJson,
    #[error("frame has no type tag")]
    MissingType,
    #[error("unknown frame type '{0}'")]
    UnknownType(String),
    #[error("heartbeat without participantId")]
    MissingParticipantId,
    #[error("participantId '{0}' is not a UUID")]
    InvalidParticipantId(String),
}

impl ClientFrame {
    /// Parse a text frame received from a client
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|_| FrameError::NotJson)?;
        let object = value.as_object().ok_or(FrameError::NotJson)?;

        let kind = object
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or(FrameError::MissingType)?;

        match kind {
            HEARTBEAT => {
                let raw = object
                    .get("participantId")
                    .and_then(|p| p.as_str())
                    .ok_or(FrameError::MissingParticipantId)?;
                let participant_id = Uuid::parse_str(raw)
                    .map_err(|_| FrameError::InvalidParticipantId(raw.to_string()))?;
                Ok(ClientFrame::Heartbeat { participant_id })
            }
            other => Err(FrameError::UnknownType(other.to_string())),
        }
    }
}

/// Outbound discussion snapshot envelope
#[derive(Debug, Serialize)]
pub struct DiscussionUpdate<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(flatten)]
    pub detail: &'a DiscussionDetail,
}

impl<'a> DiscussionUpdate<'a> {
    pub fn new(detail: &'a DiscussionDetail) -> Self {
        Self {
            kind: DISCUSSION_UPDATE,
            detail,
        }
    }

    /// Serialize the envelope into the text payload sent to subscribers
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
