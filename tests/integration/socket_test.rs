//! WebSocket route tests
//!
//! The assembled router served on an ephemeral port with a realtime hub over
//! the in-memory store, driven by a real WebSocket client.

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::common::{generate_test_token, heartbeat_frame, status_in, HubFixture};
use discussion_board::backend::routes::create_router;
use discussion_board::backend::server::{AppState, ServerConfig};
use discussion_board::shared::ParticipantStatus;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Serve the router over the fixture's hub and return its address
async fn serve(fx: &HubFixture) -> SocketAddr {
    let state = AppState::new(None, Some(fx.hub.clone()), ServerConfig::default());
    let app = create_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn socket_url(addr: SocketAddr, discussion_id: Uuid, user_id: Uuid, username: &str) -> String {
    let token = generate_test_token(user_id, username);
    format!("ws://{}/api/discussions/{}/ws?token={}", addr, discussion_id, token)
}

async fn connect(url: &str) -> WsStream {
    let (ws, _) = timeout(TIMEOUT, connect_async(url))
        .await
        .expect("timeout connecting")
        .expect("handshake failed");
    ws
}

/// Status the server answered a rejected handshake with
async fn rejected_status(url: &str) -> u16 {
    match timeout(TIMEOUT, connect_async(url)).await.expect("timeout connecting") {
        Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
        other => panic!("Expected an HTTP rejection, got {:?}", other.err()),
    }
}

/// Next text frame, parsed as JSON
async fn read_json(ws: &mut WsStream) -> serde_json::Value {
    loop {
        let message = timeout(TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn wait_for_connections(fx: &HubFixture, expected: usize) {
    timeout(TIMEOUT, async {
        while fx.hub.directory().connection_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection count never settled");
}

#[tokio::test]
async fn test_heartbeat_over_socket_then_close() {
    let fx = HubFixture::new();
    let bob = fx.join("bob");
    let addr = serve(&fx).await;

    let mut alice_ws = connect(&socket_url(addr, fx.discussion.id, fx.author.user_id, "alice")).await;
    let mut bob_ws = connect(&socket_url(addr, fx.discussion.id, bob.user_id, "bob")).await;
    wait_for_connections(&fx, 2).await;

    alice_ws
        .send(Message::text(heartbeat_frame(fx.author.id)))
        .await
        .unwrap();

    for ws in [&mut alice_ws, &mut bob_ws] {
        let update = read_json(ws).await;
        assert_eq!(update["type"], "discussion-update");
        assert_eq!(update["id"], fx.discussion.id.to_string());
        assert_eq!(status_in(&update, fx.author.id).as_deref(), Some("active"));
    }

    alice_ws.close(None).await.unwrap();
    wait_for_connections(&fx, 1).await;

    let update = read_json(&mut bob_ws).await;
    assert_eq!(status_in(&update, fx.author.id).as_deref(), Some("inactive"));
    assert_eq!(fx.status(fx.author.id), Some(ParticipantStatus::Inactive));

    bob_ws.close(None).await.unwrap();
    wait_for_connections(&fx, 0).await;
}

#[tokio::test]
async fn test_non_participant_is_forbidden() {
    let fx = HubFixture::new();
    let addr = serve(&fx).await;

    let url = socket_url(addr, fx.discussion.id, Uuid::new_v4(), "mallory");
    assert_eq!(rejected_status(&url).await, 403);
    assert_eq!(fx.hub.directory().connection_count(), 0);
}

#[tokio::test]
async fn test_missing_discussion_is_not_found() {
    let fx = HubFixture::new();
    let addr = serve(&fx).await;

    let url = socket_url(addr, Uuid::new_v4(), fx.author.user_id, "alice");
    assert_eq!(rejected_status(&url).await, 404);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let fx = HubFixture::new();
    let addr = serve(&fx).await;

    let url = format!("ws://{}/api/discussions/{}/ws", addr, fx.discussion.id);
    assert_eq!(rejected_status(&url).await, 401);
}

#[tokio::test]
async fn test_disconnected_user_receives_close() {
    let fx = HubFixture::new();
    let bob = fx.join("bob");
    let addr = serve(&fx).await;

    let mut alice_ws = connect(&socket_url(addr, fx.discussion.id, fx.author.user_id, "alice")).await;
    let mut bob_ws = connect(&socket_url(addr, fx.discussion.id, bob.user_id, "bob")).await;
    wait_for_connections(&fx, 2).await;

    assert_eq!(fx.hub.disconnect_user(fx.discussion.id, bob.user_id), 1);
    wait_for_connections(&fx, 1).await;

    let closed = timeout(TIMEOUT, async {
        loop {
            match bob_ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok());

    // the remaining socket still receives updates
    fx.hub.notify(fx.discussion.id).await;
    let update = read_json(&mut alice_ws).await;
    assert_eq!(update["type"], "discussion-update");
}
