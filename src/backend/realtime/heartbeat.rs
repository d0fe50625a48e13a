/**
 * Heartbeat and Presence Tracking
 *
 * Clients prove a participant is still looking at a discussion by sending
 * `{"type":"heartbeat","participantId":"..."}` over the socket. The
 * `HeartbeatTracker` keeps one `HeartbeatEntry` per connection that has sent
 * a heartbeat, each holding an expiry timer.
 *
 * # Presence State Machine
 *
 * - First heartbeat: mark the participant active and arm the timer.
 * - Later heartbeat: cancel the timer and arm a fresh one.
 * - Timer expiry: mark the participant inactive. The connection stays open
 *   and the timer is not re-armed until the next heartbeat.
 * - Connection close: cancel the timer, mark the participant inactive, then
 *   drop the connection from its registry.
 *
 * Every persisted status change is followed by a broadcast of the
 * discussion. Store writes are best effort; a failed write is logged and the
 * corresponding broadcast skipped.
 *
 * # Timers
 *
 * Timers are spawned tasks holding a `Weak` reference to the tracker, so a
 * pending timer never keeps the tracker alive. Each arm gets a fresh
 * generation number and an expiring timer only acts if its generation is
 * still the current one for that connection.
 *
 * # Closing While a Heartbeat Is In Flight
 *
 * A connection being closed is marked `closing` under the same lock that
 * `arm` takes, so no timer can be armed for it once the close has begun.
 * A heartbeat whose `active` write completes after its entry was cancelled
 * or expired writes `inactive` again and skips the broadcast; the last
 * write for a dead connection is always `inactive`.
 */
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::backend::realtime::broadcast::BroadcastOrchestrator;
use crate::backend::realtime::connection::ConnectionId;
use crate::backend::realtime::directory::DiscussionSocketDirectory;
use crate::backend::realtime::registry::{ConnectionObserver, ConnectionRegistry};
use crate::backend::realtime::store::DiscussionStore;
use crate::shared::discussion::ParticipantStatus;
use crate::shared::event::{ClientFrame, FrameError};

/// Default window after which a silent participant becomes inactive
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Presence state of one connection
#[derive(Debug)]
pub struct HeartbeatEntry {
    pub participant_id: Uuid,
    pub discussion_id: Uuid,
    generation: u64,
    timer: AbortHandle,
}

#[derive(Default)]
struct PresenceState {
    entries: HashMap<ConnectionId, HeartbeatEntry>,
    /// Connections whose close sequence is running
    closing: HashSet<ConnectionId>,
}

/// Per-connection heartbeat timers and the presence updates they drive
pub struct HeartbeatTracker {
    store: Arc<dyn DiscussionStore>,
    orchestrator: Arc<BroadcastOrchestrator>,
    timeout: Duration,
    state: Mutex<PresenceState>,
    generation: AtomicU64,
    this: Weak<HeartbeatTracker>,
}

impl HeartbeatTracker {
    /// Build a tracker together with the directory and orchestrator it drives
    ///
    /// The directory's registries report connection removal and closure back
    /// to the tracker through a weak reference.
    pub fn build(store: Arc<dyn DiscussionStore>, timeout: Duration) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<HeartbeatTracker>| {
            let observer: Weak<dyn ConnectionObserver> = this.clone();
            let directory = Arc::new(DiscussionSocketDirectory::with_observer(observer));
            let orchestrator = Arc::new(BroadcastOrchestrator::new(store.clone(), directory));
            Self {
                store,
                orchestrator,
                timeout,
                state: Mutex::new(PresenceState::default()),
                generation: AtomicU64::new(0),
                this: this.clone(),
            }
        })
    }

    pub fn orchestrator(&self) -> &Arc<BroadcastOrchestrator> {
        &self.orchestrator
    }

    pub fn directory(&self) -> &Arc<DiscussionSocketDirectory> {
        self.orchestrator.directory()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn lock(&self) -> MutexGuard<'_, PresenceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `connection_id` currently has an armed timer
    pub fn is_tracking(&self, connection_id: ConnectionId) -> bool {
        self.lock().entries.contains_key(&connection_id)
    }

    /// Participant the connection last sent a heartbeat for
    pub fn tracked_participant(&self, connection_id: ConnectionId) -> Option<Uuid> {
        self.lock()
            .entries
            .get(&connection_id)
            .map(|entry| entry.participant_id)
    }

    /// Handle one inbound text frame from a connection
    ///
    /// Anything other than a well-formed heartbeat is dropped.
    pub async fn handle_frame(&self, discussion_id: Uuid, connection_id: ConnectionId, text: &str) {
        match ClientFrame::parse(text) {
            Ok(ClientFrame::Heartbeat { participant_id }) => {
                self.record_heartbeat(discussion_id, connection_id, participant_id)
                    .await
            }
            Err(FrameError::UnknownType(kind)) => {
                tracing::warn!(
                    "[Realtime] Ignoring frame of unknown type '{}' on connection {}",
                    kind,
                    connection_id
                );
            }
            Err(e) => {
                tracing::debug!(
                    "[Realtime] Ignoring malformed frame on connection {}: {}",
                    connection_id,
                    e
                );
            }
        }
    }

    /// Register a heartbeat for `participant_id` arriving on `connection_id`
    pub async fn record_heartbeat(
        &self,
        discussion_id: Uuid,
        connection_id: ConnectionId,
        participant_id: Uuid,
    ) {
        let participant = match self.store.find_participant(discussion_id, participant_id).await {
            Ok(Some(participant)) => participant,
            Ok(None) => {
                tracing::debug!(
                    "[Realtime] Heartbeat for unknown participant {} in discussion {}",
                    participant_id,
                    discussion_id
                );
                return;
            }
            Err(e) => {
                tracing::warn!(
                    "[Realtime] Failed to resolve participant {}: {}",
                    participant_id,
                    e
                );
                return;
            }
        };

        if !self.arm(discussion_id, connection_id, participant_id) {
            tracing::debug!(
                "[Realtime] Heartbeat on connection {} which is no longer subscribed",
                connection_id
            );
            return;
        }

        if let Err(e) = self.store.touch_participant_last_active(participant_id).await {
            tracing::warn!(
                "[Realtime] Failed to update last activity of participant {}: {}",
                participant_id,
                e
            );
        }

        let was_active = participant.status == ParticipantStatus::Active;
        let persisted = self.persist_status(participant_id, ParticipantStatus::Active).await;

        if !self.is_tracking(connection_id) {
            tracing::debug!(
                "[Realtime] Connection {} stopped tracking participant {} during the write",
                connection_id,
                participant_id
            );
            self.persist_status(participant_id, ParticipantStatus::Inactive).await;
            return;
        }

        if persisted && !was_active {
            tracing::info!(
                "[Realtime] Participant {} is active in discussion {}",
                participant_id,
                discussion_id
            );
            self.orchestrator.notify(discussion_id).await;
        }
    }

    /// Arm a fresh expiry timer for the connection, replacing any pending one
    ///
    /// Returns false, arming nothing, once the connection is closing or no
    /// longer subscribed.
    fn arm(&self, discussion_id: Uuid, connection_id: ConnectionId, participant_id: Uuid) -> bool {
        let mut state = self.lock();
        let subscribed = !state.closing.contains(&connection_id)
            && self
                .directory()
                .get(discussion_id)
                .is_some_and(|registry| registry.contains(connection_id));
        if !subscribed {
            return false;
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let tracker = self.this.clone();
        let timeout = self.timeout;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(tracker) = tracker.upgrade() {
                tracker.expire(connection_id, generation).await;
            }
        })
        .abort_handle();

        let entry = HeartbeatEntry {
            participant_id,
            discussion_id,
            generation,
            timer,
        };
        if let Some(previous) = state.entries.insert(connection_id, entry) {
            previous.timer.abort();
        }
        true
    }

    async fn expire(&self, connection_id: ConnectionId, generation: u64) {
        let entry = {
            let mut state = self.lock();
            match state.entries.get(&connection_id) {
                Some(entry) if entry.generation == generation => state.entries.remove(&connection_id),
                _ => None,
            }
        };
        let Some(entry) = entry else {
            return;
        };

        tracing::info!(
            "[Realtime] Participant {} timed out in discussion {}",
            entry.participant_id,
            entry.discussion_id
        );

        if let Err(e) = self.store.touch_participant_last_active(entry.participant_id).await {
            tracing::warn!(
                "[Realtime] Failed to update last activity of participant {}: {}",
                entry.participant_id,
                e
            );
        }
        if self
            .persist_status(entry.participant_id, ParticipantStatus::Inactive)
            .await
        {
            self.orchestrator.notify(entry.discussion_id).await;
        }
    }

    async fn persist_status(&self, participant_id: Uuid, status: ParticipantStatus) -> bool {
        match self.store.set_participant_status(participant_id, status).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "[Realtime] Failed to mark participant {} {}: {}",
                    participant_id,
                    status.as_str(),
                    e
                );
                false
            }
        }
    }

    fn cancel(&self, connection_id: ConnectionId) -> Option<HeartbeatEntry> {
        let entry = self.lock().entries.remove(&connection_id)?;
        entry.timer.abort();
        Some(entry)
    }
}

#[async_trait]
impl ConnectionObserver for HeartbeatTracker {
    fn connection_removed(&self, connection_id: ConnectionId) {
        self.cancel(connection_id);
    }

    async fn connection_closed(&self, registry: &ConnectionRegistry, connection_id: ConnectionId) {
        let entry = {
            let mut state = self.lock();
            state.closing.insert(connection_id);
            state.entries.remove(&connection_id)
        };
        if let Some(entry) = &entry {
            entry.timer.abort();
        }

        let persisted = match &entry {
            Some(entry) => {
                self.persist_status(entry.participant_id, ParticipantStatus::Inactive)
                    .await
            }
            None => false,
        };

        registry.remove(connection_id);
        self.lock().closing.remove(&connection_id);

        if persisted {
            self.orchestrator.notify(registry.discussion_id()).await;
        }
    }
}

impl Drop for HeartbeatTracker {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for entry in state.entries.values() {
            entry.timer.abort();
        }
    }
}
