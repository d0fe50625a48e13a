/**
 * Postgres Discussion Store
 *
 * Implements the realtime subsystem's `DiscussionStore` contract on top of
 * the queries in `discussions::db`.
 */
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::discussions::db;
use crate::backend::realtime::store::{DiscussionStore, StoreError};
use crate::shared::discussion::{DiscussionDetail, Participant, ParticipantStatus};

/// `DiscussionStore` backed by a Postgres pool
#[derive(Clone)]
pub struct PgDiscussionStore {
    pool: PgPool,
}

impl PgDiscussionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Decode(e) => StoreError::Corrupt(e.to_string()),
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl DiscussionStore for PgDiscussionStore {
    async fn discussion_detail(
        &self,
        discussion_id: Uuid,
    ) -> Result<Option<DiscussionDetail>, StoreError> {
        db::discussion_detail(&self.pool, discussion_id)
            .await
            .map_err(map_error)
    }

    async fn find_participant(
        &self,
        discussion_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<Participant>, StoreError> {
        db::find_participant(&self.pool, discussion_id, participant_id)
            .await
            .map_err(map_error)
    }

    async fn set_participant_status(
        &self,
        participant_id: Uuid,
        status: ParticipantStatus,
    ) -> Result<(), StoreError> {
        db::set_participant_status(&self.pool, participant_id, status)
            .await
            .map_err(map_error)
    }

    async fn touch_participant_last_active(&self, participant_id: Uuid) -> Result<(), StoreError> {
        db::touch_participant_last_active(&self.pool, participant_id)
            .await
            .map_err(map_error)
    }
}
