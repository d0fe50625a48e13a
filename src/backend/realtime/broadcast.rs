/**
 * Discussion Update Broadcasting
 *
 * The `BroadcastOrchestrator` turns "discussion X changed" into a
 * `discussion-update` frame on every socket subscribed to X. It re-reads the
 * full discussion detail from the store on every call, so subscribers always
 * receive a complete snapshot rather than a delta.
 *
 * # Failure Handling
 *
 * `notify` never returns an error. A discussion deleted in the meantime, a
 * store failure or a serialization failure is logged and reported through
 * `NotifyOutcome`; the mutation that triggered the notification has already
 * succeeded and its HTTP response does not depend on the broadcast.
 */
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::realtime::directory::DiscussionSocketDirectory;
use crate::backend::realtime::registry::BroadcastReport;
use crate::backend::realtime::store::DiscussionStore;
use crate::shared::event::DiscussionUpdate;

/// What a call to `notify` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The discussion no longer exists; nothing was sent
    DiscussionMissing,
    /// Nobody is subscribed to the discussion
    NoSubscribers,
    /// The update was handed to the discussion's registry
    Broadcast(BroadcastReport),
    /// Loading or serializing the discussion failed
    Failed,
}

/// Reloads discussion state and fans it out to subscribers
pub struct BroadcastOrchestrator {
    store: Arc<dyn DiscussionStore>,
    directory: Arc<DiscussionSocketDirectory>,
}

impl BroadcastOrchestrator {
    pub fn new(store: Arc<dyn DiscussionStore>, directory: Arc<DiscussionSocketDirectory>) -> Self {
        Self { store, directory }
    }

    pub fn directory(&self) -> &Arc<DiscussionSocketDirectory> {
        &self.directory
    }

    /// Push the current state of `discussion_id` to all of its subscribers
    pub async fn notify(&self, discussion_id: Uuid) -> NotifyOutcome {
        let detail = match self.store.discussion_detail(discussion_id).await {
            Ok(Some(detail)) => detail,
            Ok(None) => {
                tracing::debug!(
                    "[Realtime] Discussion {} no longer exists, skipping update",
                    discussion_id
                );
                return NotifyOutcome::DiscussionMissing;
            }
            Err(e) => {
                tracing::warn!(
                    "[Realtime] Failed to load discussion {} for update: {}",
                    discussion_id,
                    e
                );
                return NotifyOutcome::Failed;
            }
        };

        let payload = match DiscussionUpdate::new(&detail).to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    "[Realtime] Failed to serialize discussion {}: {}",
                    discussion_id,
                    e
                );
                return NotifyOutcome::Failed;
            }
        };

        let Some(registry) = self.directory.get(discussion_id) else {
            return NotifyOutcome::NoSubscribers;
        };

        let report = registry.broadcast(&payload);
        tracing::info!(
            "[Realtime] Update for discussion {} sent to {} subscribers ({} failed)",
            discussion_id,
            report.delivered,
            report.failed
        );
        NotifyOutcome::Broadcast(report)
    }
}
