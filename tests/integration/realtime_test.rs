//! Realtime integration tests
//!
//! Several participants connected to one discussion, driven through the
//! hub exactly as the socket pump and the REST handlers drive it.

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::time::Duration;
use uuid::Uuid;

use crate::common::{drain_updates, settle, status_in, HubFixture};
use discussion_board::backend::realtime::NotifyOutcome;
use discussion_board::shared::ParticipantStatus;

#[tokio::test(start_paused = true)]
async fn test_presence_lifecycle_across_participants() {
    let fx = HubFixture::new();
    let bob = fx.join("bob");
    let (alice_conn, mut alice_rx) = fx.connect();
    let (bob_conn, mut bob_rx) = fx.connect();

    fx.heartbeat(alice_conn, fx.author.id).await;
    fx.heartbeat(bob_conn, bob.id).await;

    // two transitions, each seen by both sockets
    let alice_view = drain_updates(&mut alice_rx);
    let bob_view = drain_updates(&mut bob_rx);
    assert_eq!(alice_view.len(), 2);
    assert_eq!(bob_view.len(), 2);
    assert_eq!(status_in(&alice_view[1], bob.id).as_deref(), Some("active"));
    assert_eq!(status_in(&bob_view[1], fx.author.id).as_deref(), Some("active"));

    // bob keeps beating, alice goes quiet
    tokio::time::advance(Duration::from_secs(40)).await;
    settle().await;
    fx.heartbeat(bob_conn, bob.id).await;
    tokio::time::advance(Duration::from_secs(21)).await;
    settle().await;

    assert_eq!(fx.status(fx.author.id), Some(ParticipantStatus::Inactive));
    assert_eq!(fx.status(bob.id), Some(ParticipantStatus::Active));
    let updates = drain_updates(&mut bob_rx);
    assert_eq!(updates.len(), 1);
    assert_eq!(status_in(&updates[0], fx.author.id).as_deref(), Some("inactive"));
    assert_eq!(status_in(&updates[0], bob.id).as_deref(), Some("active"));
    drain_updates(&mut alice_rx);

    // bob's socket closes: alice hears about it, bob's registry slot is gone
    drop(bob_rx);
    settle().await;

    assert_eq!(fx.status(bob.id), Some(ParticipantStatus::Inactive));
    let updates = drain_updates(&mut alice_rx);
    assert_eq!(updates.len(), 1);
    assert_eq!(status_in(&updates[0], bob.id).as_deref(), Some("inactive"));

    let registry = fx.hub.directory().get(fx.discussion.id).unwrap();
    assert!(registry.contains(alice_conn));
    assert!(!registry.contains(bob_conn));
    assert!(!fx.hub.heartbeats().is_tracking(bob_conn));
}

#[tokio::test]
async fn test_comment_notify_reaches_every_subscriber() {
    let fx = HubFixture::new();
    let (_a, mut rx_a) = fx.connect();
    let (_b, mut rx_b) = fx.connect();

    fx.store
        .add_comment(fx.discussion.id, fx.author.id, "Use iterators")
        .unwrap();
    let outcome = fx.hub.notify(fx.discussion.id).await;

    let report = assert_matches!(outcome, NotifyOutcome::Broadcast(report) => report);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 0);

    for rx in [&mut rx_a, &mut rx_b] {
        let updates = drain_updates(rx);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["comments"][0]["content"], "Use iterators");
        assert_eq!(updates[0]["id"], fx.discussion.id.to_string());
    }
}

#[tokio::test]
async fn test_updates_do_not_leak_between_discussions() {
    let fx = HubFixture::new();
    let other = fx.store.create_discussion("Lifetimes", "carol");
    let (_a, mut rx_a) = fx.connect();

    let outcome = fx.hub.notify(other.id).await;

    assert_matches!(outcome, NotifyOutcome::NoSubscribers);
    assert!(drain_updates(&mut rx_a).is_empty());
}

#[tokio::test]
async fn test_heartbeat_for_foreign_participant_is_ignored() {
    let fx = HubFixture::new();
    let other = fx.store.create_discussion("Macros", "dave");
    let (conn, mut rx) = fx.connect();

    // a participant of another discussion is unknown here
    fx.heartbeat(conn, other.participants[0].id).await;
    fx.heartbeat(conn, Uuid::new_v4()).await;

    assert!(!fx.hub.heartbeats().is_tracking(conn));
    assert_eq!(fx.status(other.participants[0].id), Some(ParticipantStatus::Inactive));
    assert!(drain_updates(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_drops_registry_after_last_connection_closes() {
    let fx = HubFixture::new();
    let (_conn, rx) = fx.connect();
    let _sweeper = fx.hub.spawn_sweeper();

    drop(rx);
    settle().await;
    assert_eq!(fx.hub.directory().connection_count(), 0);

    tokio::time::advance(fx.hub.config().sweep_interval + Duration::from_secs(1)).await;
    settle().await;

    assert!(fx.hub.directory().get(fx.discussion.id).is_none());
}
