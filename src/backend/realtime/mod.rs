//! Real-time Discussion Updates
//!
//! This module pushes live discussion snapshots to WebSocket subscribers and
//! tracks participant presence through client heartbeats.
//!
//! # Architecture
//!
//! The realtime module is organized into focused submodules:
//!
//! - **`connection`** - Handle to one open socket (id + outbound channel)
//! - **`registry`** - Connections subscribed to one discussion
//! - **`directory`** - Discussion id to registry map
//! - **`heartbeat`** - Per-connection expiry timers and presence updates
//! - **`broadcast`** - Reload a discussion and fan it out to its subscribers
//! - **`store`** - Persistence contract the subsystem depends on
//! - **`subscription`** - WebSocket upgrade handler and socket pump
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - RealtimeHub facade and configuration
//! ├── connection.rs   - Connection handle
//! ├── registry.rs     - ConnectionRegistry
//! ├── directory.rs    - DiscussionSocketDirectory
//! ├── heartbeat.rs    - HeartbeatTracker
//! ├── broadcast.rs    - BroadcastOrchestrator
//! ├── store.rs        - DiscussionStore trait + in-memory store
//! └── subscription.rs - GET /api/discussions/{id}/ws
//! ```
//!
//! # Ownership
//!
//! `RealtimeHub::new` wires everything together; there is no global state.
//! The hub owns the heartbeat tracker, which owns the broadcast orchestrator,
//! which owns the directory. Registries point back at the tracker through a
//! `Weak` reference only.
//!
//! # Example
//!
//! ```rust,no_run
//! use discussion_board::backend::realtime::{InMemoryDiscussionStore, RealtimeConfig, RealtimeHub};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let store = Arc::new(InMemoryDiscussionStore::new());
//! let discussion = store.create_discussion("Welcome", "alice");
//! let hub = RealtimeHub::new(store, RealtimeConfig::default());
//! hub.notify(discussion.id).await;
//! # }
//! ```

/// Connection handle
pub mod connection;

/// Per-discussion connection registry
pub mod registry;

/// Discussion socket directory
pub mod directory;

/// Heartbeat and presence tracking
pub mod heartbeat;

/// Discussion update broadcasting
pub mod broadcast;

/// Store contract
pub mod store;

/// WebSocket subscription handler
pub mod subscription;

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub use broadcast::{BroadcastOrchestrator, NotifyOutcome};
pub use connection::{Connection, ConnectionId, ConnectionReceiver, RealtimeError};
pub use directory::DiscussionSocketDirectory;
pub use heartbeat::{HeartbeatTracker, DEFAULT_HEARTBEAT_TIMEOUT};
pub use registry::{BroadcastReport, ConnectionObserver, ConnectionRegistry};
pub use store::{DiscussionStore, InMemoryDiscussionStore, StoreCall, StoreError};
pub use subscription::{discussion_socket, serve_socket};

/// Tunables of the realtime subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// Silence after which a participant is marked inactive
    pub heartbeat_timeout: Duration,
    /// How often empty registries are evicted
    pub sweep_interval: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            sweep_interval: Duration::from_secs(300),
        }
    }
}

/// Entry point used by HTTP handlers and socket tasks
#[derive(Clone)]
pub struct RealtimeHub {
    store: Arc<dyn DiscussionStore>,
    tracker: Arc<HeartbeatTracker>,
    config: RealtimeConfig,
}

impl RealtimeHub {
    pub fn new(store: Arc<dyn DiscussionStore>, config: RealtimeConfig) -> Self {
        let tracker = HeartbeatTracker::build(store.clone(), config.heartbeat_timeout);
        Self {
            store,
            tracker,
            config,
        }
    }

    pub fn config(&self) -> RealtimeConfig {
        self.config
    }

    pub fn store(&self) -> &Arc<dyn DiscussionStore> {
        &self.store
    }

    pub fn directory(&self) -> &Arc<DiscussionSocketDirectory> {
        self.tracker.directory()
    }

    pub fn heartbeats(&self) -> &Arc<HeartbeatTracker> {
        &self.tracker
    }

    /// Start delivering updates of `discussion_id` to `connection`
    pub fn subscribe(&self, discussion_id: Uuid, connection: Connection) -> Arc<ConnectionRegistry> {
        self.directory().subscribe(discussion_id, connection)
    }

    /// Broadcast the current state of `discussion_id`; never fails
    pub async fn notify(&self, discussion_id: Uuid) -> NotifyOutcome {
        self.tracker.orchestrator().notify(discussion_id).await
    }

    /// Feed an inbound text frame from `connection_id` to the tracker
    pub async fn handle_frame(&self, discussion_id: Uuid, connection_id: ConnectionId, text: &str) {
        self.tracker
            .handle_frame(discussion_id, connection_id, text)
            .await
    }

    /// Close every socket `user_id` holds on `discussion_id`
    ///
    /// Used when a user leaves a discussion, so they stop receiving its
    /// updates. Returns the number of sockets closed.
    pub fn disconnect_user(&self, discussion_id: Uuid, user_id: Uuid) -> usize {
        self.directory()
            .get(discussion_id)
            .map_or(0, |registry| registry.disconnect_user(user_id))
    }

    /// Periodically evict registries that lost all their connections
    ///
    /// The task stops on its own once the hub is dropped.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let directory = Arc::downgrade(self.directory());
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(directory) = directory.upgrade() else {
                    break;
                };
                let evicted = directory.sweep_empty();
                tracing::debug!(
                    "[Realtime] Registry sweep evicted {} ({} remaining)",
                    evicted,
                    directory.len()
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_empty_registries() {
        let store = Arc::new(InMemoryDiscussionStore::new());
        let hub = RealtimeHub::new(store, RealtimeConfig::default());
        let discussion_id = Uuid::new_v4();

        let (connection, receiver) = Connection::channel();
        hub.subscribe(discussion_id, connection);
        drop(receiver);
        let _sweeper = hub.spawn_sweeper();

        tokio::time::sleep(Duration::from_secs(301)).await;

        assert!(hub.directory().get(discussion_id).is_none());
    }

    #[test]
    fn test_default_config() {
        let config = RealtimeConfig::default();
        assert_eq!(config.heartbeat_timeout, Duration::from_secs(60));
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_disconnect_user_scoped_to_discussion() {
        let store = Arc::new(InMemoryDiscussionStore::new());
        let hub = RealtimeHub::new(store, RealtimeConfig::default());
        let (left, other) = (Uuid::new_v4(), Uuid::new_v4());
        let user_id = Uuid::new_v4();

        let (connection, _left_rx) = Connection::user_channel(user_id);
        hub.subscribe(left, connection);
        let (connection, _other_rx) = Connection::user_channel(user_id);
        hub.subscribe(other, connection);

        assert_eq!(hub.disconnect_user(left, user_id), 1);
        assert!(hub.directory().get(left).unwrap().is_empty());
        assert_eq!(hub.directory().get(other).unwrap().len(), 1);
        assert_eq!(hub.disconnect_user(Uuid::new_v4(), user_id), 0);
    }
}
