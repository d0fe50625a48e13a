/**
 * Per-Discussion Connection Registry
 *
 * A `ConnectionRegistry` holds the open WebSocket connections subscribed to
 * one discussion. `add`, `remove` and `broadcast` all run under the same
 * mutex, so a broadcast sees each connection either fully registered or not
 * at all.
 *
 * # Close Handling
 *
 * `add` spawns a watcher task per connection. When the socket task drops its
 * receiver, the watcher hands the connection to the registry's
 * `ConnectionObserver` (the heartbeat tracker), then removes it. The watcher
 * only holds a `Weak` reference to the registry.
 *
 * # Delivery
 *
 * Broadcasts are best effort. A failed send to one connection is logged and
 * counted in the returned `BroadcastReport`; the remaining connections still
 * receive the frame.
 */
use async_trait::async_trait;
use axum::extract::ws::Message;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use uuid::Uuid;

use crate::backend::realtime::connection::{Connection, ConnectionId};

/// Hooks invoked by a registry when connections leave it
#[async_trait]
pub trait ConnectionObserver: Send + Sync {
    /// A connection left the registry; drop any per-connection state
    fn connection_removed(&self, connection_id: ConnectionId);

    /// The connection's channel terminated. Implementations run their close
    /// sequence and may remove the connection from `registry` themselves;
    /// the registry removes it afterwards regardless.
    async fn connection_closed(&self, registry: &ConnectionRegistry, connection_id: ConnectionId);
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the frame was queued for
    pub delivered: usize,
    /// Connections whose channel was already closed
    pub failed: usize,
}

/// Open connections subscribed to a single discussion
pub struct ConnectionRegistry {
    discussion_id: Uuid,
    connections: Mutex<HashMap<ConnectionId, Connection>>,
    observer: Option<Weak<dyn ConnectionObserver>>,
}

impl ConnectionRegistry {
    pub fn new(discussion_id: Uuid) -> Self {
        Self {
            discussion_id,
            connections: Mutex::new(HashMap::new()),
            observer: None,
        }
    }

    /// Create a registry that reports removals and closes to `observer`
    pub fn with_observer(discussion_id: Uuid, observer: Weak<dyn ConnectionObserver>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new(discussion_id)
        }
    }

    pub fn discussion_id(&self) -> Uuid {
        self.discussion_id
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Connection>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observer(&self) -> Option<Arc<dyn ConnectionObserver>> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }

    /// Register an open connection and watch it for closure
    ///
    /// The connection receives broadcasts as soon as this returns.
    pub fn add(self: &Arc<Self>, connection: Connection) {
        let connection_id = connection.id();
        let watched = connection.clone();
        let count = {
            let mut connections = self.lock();
            connections.insert(connection_id, connection);
            connections.len()
        };

        tracing::debug!(
            "[Realtime] Connection {} joined discussion {} ({} open)",
            connection_id,
            self.discussion_id,
            count
        );

        let registry = Arc::downgrade(self);
        tokio::spawn(async move {
            watched.closed().await;
            if let Some(registry) = registry.upgrade() {
                registry.handle_close(connection_id).await;
            }
        });
    }

    /// Remove a connection; returns whether it was registered
    ///
    /// Safe to call any number of times. Any heartbeat state held by the
    /// observer for this connection is cleared as well.
    pub fn remove(&self, connection_id: ConnectionId) -> bool {
        let removed = self.lock().remove(&connection_id).is_some();
        if removed {
            tracing::debug!(
                "[Realtime] Connection {} left discussion {}",
                connection_id,
                self.discussion_id
            );
        }
        if let Some(observer) = self.observer() {
            observer.connection_removed(connection_id);
        }
        removed
    }

    /// Close and remove every connection opened by `user_id`
    ///
    /// Each socket is sent a Close frame, which ends its writer. Returns the
    /// number of connections removed.
    pub fn disconnect_user(&self, user_id: Uuid) -> usize {
        let removed: Vec<Connection> = {
            let mut connections = self.lock();
            let ids: Vec<ConnectionId> = connections
                .values()
                .filter(|connection| connection.user_id() == Some(user_id))
                .map(Connection::id)
                .collect();
            ids.iter()
                .filter_map(|id| connections.remove(id))
                .collect()
        };

        for connection in &removed {
            // a socket that is already gone has nothing to close
            let _ = connection.send(Message::Close(None));
            if let Some(observer) = self.observer() {
                observer.connection_removed(connection.id());
            }
        }

        if !removed.is_empty() {
            tracing::debug!(
                "[Realtime] Disconnected {} socket(s) of user {} from discussion {}",
                removed.len(),
                user_id,
                self.discussion_id
            );
        }
        removed.len()
    }

    async fn handle_close(&self, connection_id: ConnectionId) {
        if !self.contains(connection_id) {
            return;
        }
        tracing::debug!(
            "[Realtime] Connection {} closed in discussion {}",
            connection_id,
            self.discussion_id
        );
        if let Some(observer) = self.observer() {
            observer.connection_closed(self, connection_id).await;
        }
        self.remove(connection_id);
    }

    /// Send a text frame to every registered connection
    pub fn broadcast(&self, text: &str) -> BroadcastReport {
        let message = Message::Text(text.into());
        let connections = self.lock();
        let mut report = BroadcastReport::default();

        for connection in connections.values() {
            match connection.send(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "[Realtime] Failed to deliver to discussion {}: {}",
                        self.discussion_id,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.lock().contains_key(&connection_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Ids of the currently registered connections
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.lock().keys().copied().collect()
    }
}
