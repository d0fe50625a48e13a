//! Realtime fixtures
//!
//! A `RealtimeHub` over an `InMemoryDiscussionStore` with one discussion,
//! plus helpers to open connections and read the frames they receive.

use axum::extract::ws::Message;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use discussion_board::backend::realtime::{
    Connection, ConnectionId, ConnectionReceiver, InMemoryDiscussionStore, RealtimeConfig,
    RealtimeHub,
};
use discussion_board::shared::{DiscussionDetail, Participant, ParticipantStatus};

pub struct HubFixture {
    pub store: Arc<InMemoryDiscussionStore>,
    pub hub: RealtimeHub,
    pub discussion: DiscussionDetail,
    pub author: Participant,
}

impl HubFixture {
    pub fn new() -> Self {
        Self::with_config(RealtimeConfig::default())
    }

    pub fn with_config(config: RealtimeConfig) -> Self {
        let store = Arc::new(InMemoryDiscussionStore::new());
        let discussion = store.create_discussion("Borrow checker tips", "alice");
        let author = discussion.participants[0].clone();
        let hub = RealtimeHub::new(store.clone(), config);
        Self {
            store,
            hub,
            discussion,
            author,
        }
    }

    /// Join another participant to the fixture discussion
    pub fn join(&self, username: &str) -> Participant {
        self.store
            .add_participant(self.discussion.id, username)
            .expect("discussion exists")
    }

    /// Open a connection subscribed to the fixture discussion
    pub fn connect(&self) -> (ConnectionId, ConnectionReceiver) {
        let (connection, receiver) = Connection::channel();
        let id = connection.id();
        self.hub.subscribe(self.discussion.id, connection);
        (id, receiver)
    }

    pub async fn heartbeat(&self, connection_id: ConnectionId, participant_id: Uuid) {
        self.hub
            .handle_frame(self.discussion.id, connection_id, &heartbeat_frame(participant_id))
            .await;
    }

    pub fn status(&self, participant_id: Uuid) -> Option<ParticipantStatus> {
        self.store.participant_status(participant_id)
    }
}

impl Default for HubFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Short timeouts for tests that run on the real clock
pub fn fast_config() -> RealtimeConfig {
    RealtimeConfig {
        heartbeat_timeout: Duration::from_millis(50),
        sweep_interval: Duration::from_millis(50),
    }
}

pub fn heartbeat_frame(participant_id: Uuid) -> String {
    serde_json::json!({ "type": "heartbeat", "participantId": participant_id }).to_string()
}

/// Let spawned timer and close-watcher tasks run
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Every `discussion-update` frame currently queued on `receiver`
pub fn drain_updates(receiver: &mut ConnectionReceiver) -> Vec<serde_json::Value> {
    let mut updates = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        let Message::Text(text) = message else {
            panic!("Expected text frame, got {:?}", message);
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["type"], "discussion-update");
        updates.push(value);
    }
    updates
}

/// Status of `participant_id` as carried by an update frame
pub fn status_in(update: &serde_json::Value, participant_id: Uuid) -> Option<String> {
    update["participants"]
        .as_array()?
        .iter()
        .find(|p| p["id"] == participant_id.to_string())
        .and_then(|p| p["status"].as_str())
        .map(str::to_string)
}
