/**
 * Discussion Socket Directory
 *
 * Maps a discussion id to the `ConnectionRegistry` holding its subscribers.
 * Registries are created lazily on first subscription. The map is guarded by
 * a single mutex, so concurrent `get_or_create` calls for the same id always
 * resolve to the same registry.
 *
 * # Eviction
 *
 * Registries that have lost all their connections are dropped by
 * `sweep_empty`, which the server runs periodically. Re-creating a registry
 * later is harmless, so a registry evicted between a broadcast lookup and a
 * new subscription only costs one allocation.
 *
 * Lock order is directory first, then registry.
 */
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use uuid::Uuid;

use crate::backend::realtime::connection::Connection;
use crate::backend::realtime::registry::{ConnectionObserver, ConnectionRegistry};

/// Process-wide map of discussion id to connection registry
pub struct DiscussionSocketDirectory {
    registries: Mutex<HashMap<Uuid, Arc<ConnectionRegistry>>>,
    observer: Option<Weak<dyn ConnectionObserver>>,
}

impl Default for DiscussionSocketDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscussionSocketDirectory {
    pub fn new() -> Self {
        Self {
            registries: Mutex::new(HashMap::new()),
            observer: None,
        }
    }

    /// Directory whose registries report to `observer`
    pub fn with_observer(observer: Weak<dyn ConnectionObserver>) -> Self {
        Self {
            registries: Mutex::new(HashMap::new()),
            observer: Some(observer),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<ConnectionRegistry>>> {
        self.registries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_registry(&self, discussion_id: Uuid) -> Arc<ConnectionRegistry> {
        let registry = match &self.observer {
            Some(observer) => ConnectionRegistry::with_observer(discussion_id, observer.clone()),
            None => ConnectionRegistry::new(discussion_id),
        };
        tracing::debug!("[Realtime] Created registry for discussion {}", discussion_id);
        Arc::new(registry)
    }

    /// Registry for `discussion_id`, created if absent
    pub fn get_or_create(&self, discussion_id: Uuid) -> Arc<ConnectionRegistry> {
        let mut registries = self.lock();
        registries
            .entry(discussion_id)
            .or_insert_with(|| self.create_registry(discussion_id))
            .clone()
    }

    /// Registry for `discussion_id`, if one exists
    pub fn get(&self, discussion_id: Uuid) -> Option<Arc<ConnectionRegistry>> {
        self.lock().get(&discussion_id).cloned()
    }

    /// Add `connection` to the discussion's registry
    ///
    /// Lookup and insertion happen under the directory lock, so a concurrent
    /// sweep can never evict the registry between the two steps.
    pub fn subscribe(&self, discussion_id: Uuid, connection: Connection) -> Arc<ConnectionRegistry> {
        let mut registries = self.lock();
        let registry = registries
            .entry(discussion_id)
            .or_insert_with(|| self.create_registry(discussion_id))
            .clone();
        registry.add(connection);
        registry
    }

    /// Drop every registry without connections; returns how many were evicted
    pub fn sweep_empty(&self) -> usize {
        let mut registries = self.lock();
        let before = registries.len();
        registries.retain(|_, registry| !registry.is_empty());
        let evicted = before - registries.len();
        if evicted > 0 {
            tracing::debug!("[Realtime] Evicted {} empty registries", evicted);
        }
        evicted
    }

    /// Number of registries currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total open connections across all discussions
    pub fn connection_count(&self) -> usize {
        self.lock().values().map(|registry| registry.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_does_not_create() {
        let directory = DiscussionSocketDirectory::new();
        let id = Uuid::new_v4();

        assert!(directory.get(id).is_none());
        assert!(directory.is_empty());

        let created = directory.get_or_create(id);
        let found = directory.get(id).unwrap();
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(found.discussion_id(), id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_or_create_yields_one_registry() {
        let directory = Arc::new(DiscussionSocketDirectory::new());
        let id = Uuid::new_v4();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let directory = directory.clone();
                tokio::spawn(async move { directory.get_or_create(id) })
            })
            .collect();

        let mut registries = Vec::new();
        for handle in handles {
            registries.push(handle.await.unwrap());
        }

        assert_eq!(directory.len(), 1);
        assert!(registries.iter().all(|r| Arc::ptr_eq(r, &registries[0])));
    }

    #[tokio::test]
    async fn test_subscribe_registers_connection() {
        let directory = DiscussionSocketDirectory::new();
        let id = Uuid::new_v4();
        let (connection, _receiver) = Connection::channel();
        let connection_id = connection.id();

        let registry = directory.subscribe(id, connection);

        assert!(registry.contains(connection_id));
        assert_eq!(directory.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_empty_registries() {
        let directory = DiscussionSocketDirectory::new();
        let busy = Uuid::new_v4();
        let idle = Uuid::new_v4();

        let (connection, _receiver) = Connection::channel();
        directory.subscribe(busy, connection);
        directory.get_or_create(idle);

        assert_eq!(directory.sweep_empty(), 1);
        assert!(directory.get(busy).is_some());
        assert!(directory.get(idle).is_none());
        assert_eq!(directory.sweep_empty(), 0);
    }
}
