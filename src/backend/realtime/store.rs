/**
 * Discussion Store Contract
 *
 * The realtime subsystem never talks to the database directly. It reads
 * discussion snapshots and writes participant presence through the
 * `DiscussionStore` trait, which the Postgres layer implements in
 * `backend::discussions::store`.
 *
 * `InMemoryDiscussionStore` implements the same contract over a mutex-guarded
 * map. The test suites drive the realtime subsystem with it, and it records
 * every call so tests can assert on store traffic.
 */
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::discussion::{
    AuthorSummary, Comment, DiscussionDetail, Participant, ParticipantStatus,
};

/// Errors surfaced by a discussion store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped to the domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The store refused the operation (used by test stores to inject failures)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations the realtime subsystem depends on
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Full discussion detail including participants and comments
    async fn discussion_detail(
        &self,
        discussion_id: Uuid,
    ) -> Result<Option<DiscussionDetail>, StoreError>;

    /// Participant `participant_id`, if it belongs to `discussion_id`
    async fn find_participant(
        &self,
        discussion_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<Participant>, StoreError>;

    /// Persist a participant's presence status
    async fn set_participant_status(
        &self,
        participant_id: Uuid,
        status: ParticipantStatus,
    ) -> Result<(), StoreError>;

    /// Bump a participant's last-active timestamp to now
    async fn touch_participant_last_active(&self, participant_id: Uuid) -> Result<(), StoreError>;
}

/// Calls observed by `InMemoryDiscussionStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCall {
    DiscussionDetail(Uuid),
    FindParticipant(Uuid),
    SetStatus(Uuid, ParticipantStatus),
    TouchLastActive(Uuid),
}

#[derive(Default)]
struct MemoryState {
    discussions: HashMap<Uuid, DiscussionDetail>,
    calls: Vec<StoreCall>,
    fail_writes: bool,
}

/// Discussion store kept entirely in memory
#[derive(Default)]
pub struct InMemoryDiscussionStore {
    state: Mutex<MemoryState>,
}

impl InMemoryDiscussionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a discussion snapshot
    pub fn insert_discussion(&self, detail: DiscussionDetail) {
        self.lock().discussions.insert(detail.id, detail);
    }

    /// Create a discussion whose author is already its first participant
    pub fn create_discussion(&self, title: &str, author_username: &str) -> DiscussionDetail {
        let now = Utc::now();
        let discussion_id = Uuid::new_v4();
        let author = AuthorSummary {
            id: Uuid::new_v4(),
            username: author_username.to_string(),
        };
        let detail = DiscussionDetail {
            id: discussion_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
            participants: vec![Participant {
                id: Uuid::new_v4(),
                discussion_id,
                user_id: author.id,
                username: author.username.clone(),
                joined_at: now,
                status: ParticipantStatus::Inactive,
                last_active_at: None,
                is_author: true,
            }],
            author,
            comments: Vec::new(),
        };
        self.insert_discussion(detail.clone());
        detail
    }

    /// Join a new user to an existing discussion
    pub fn add_participant(&self, discussion_id: Uuid, username: &str) -> Option<Participant> {
        let mut state = self.lock();
        let discussion = state.discussions.get_mut(&discussion_id)?;
        let participant = Participant {
            id: Uuid::new_v4(),
            discussion_id,
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            joined_at: Utc::now(),
            status: ParticipantStatus::Inactive,
            last_active_at: None,
            is_author: false,
        };
        discussion.participants.push(participant.clone());
        Some(participant)
    }

    /// Post a comment on behalf of a participant
    pub fn add_comment(
        &self,
        discussion_id: Uuid,
        participant_id: Uuid,
        content: &str,
    ) -> Option<Comment> {
        let mut state = self.lock();
        let discussion = state.discussions.get_mut(&discussion_id)?;
        let author_username = discussion.participant(participant_id)?.username.clone();
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            discussion_id,
            participant_id,
            author_username,
        };
        discussion.comments.push(comment.clone());
        Some(comment)
    }

    /// Drop a discussion, as if it had been deleted
    pub fn remove_discussion(&self, discussion_id: Uuid) {
        self.lock().discussions.remove(&discussion_id);
    }

    /// Current status of a participant in any discussion
    pub fn participant_status(&self, participant_id: Uuid) -> Option<ParticipantStatus> {
        self.lock()
            .discussions
            .values()
            .find_map(|d| d.participant(participant_id))
            .map(|p| p.status)
    }

    /// Make every write fail until turned off again
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Every call made against the store so far
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of status writes issued so far
    pub fn status_writes(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::SetStatus(..)))
            .count()
    }

    /// Number of detail reads issued so far
    pub fn detail_reads(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::DiscussionDetail(_)))
            .count()
    }

    fn participant_mut(state: &mut MemoryState, participant_id: Uuid) -> Option<&mut Participant> {
        state
            .discussions
            .values_mut()
            .flat_map(|d| d.participants.iter_mut())
            .find(|p| p.id == participant_id)
    }
}

#[async_trait]
impl DiscussionStore for InMemoryDiscussionStore {
    async fn discussion_detail(
        &self,
        discussion_id: Uuid,
    ) -> Result<Option<DiscussionDetail>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::DiscussionDetail(discussion_id));
        Ok(state.discussions.get(&discussion_id).cloned())
    }

    async fn find_participant(
        &self,
        discussion_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<Participant>, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::FindParticipant(participant_id));
        Ok(state
            .discussions
            .get(&discussion_id)
            .and_then(|d| d.participant(participant_id))
            .cloned())
    }

    async fn set_participant_status(
        &self,
        participant_id: Uuid,
        status: ParticipantStatus,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::SetStatus(participant_id, status));
        if state.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        if let Some(participant) = Self::participant_mut(&mut state, participant_id) {
            participant.status = status;
        }
        Ok(())
    }

    async fn touch_participant_last_active(&self, participant_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::TouchLastActive(participant_id));
        if state.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        if let Some(participant) = Self::participant_mut(&mut state, participant_id) {
            participant.last_active_at = Some(Utc::now());
        }
        Ok(())
    }
}
