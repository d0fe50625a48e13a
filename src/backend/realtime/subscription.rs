/**
 * Discussion WebSocket Subscription
 *
 * This module implements `GET /api/discussions/{id}/ws`. After the upgrade
 * the socket is split into a reader and a writer task:
 *
 * - The writer drains the connection's channel into the socket sink, so
 *   every broadcast reaches the client in the order it was queued.
 * - The reader hands each inbound text frame to the heartbeat tracker, one
 *   frame at a time.
 *
 * When either side finishes the other task is aborted. The writer also
 * stops after forwarding a Close frame, which is how the server drops the
 * sockets of a user who left the discussion. Dropping the writer releases the channel
 * receiver, which is what the registry's close watcher waits for; the
 * presence close sequence runs from there.
 *
 * # Access
 *
 * The route sits behind the auth middleware (which also accepts `?token=`,
 * since browsers cannot set headers on a WebSocket handshake) and only
 * participants of the discussion may subscribe.
 */
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::connection::Connection;
use crate::backend::realtime::RealtimeHub;
use crate::backend::server::state::AppState;

/// Upgrade a participant's request to a discussion update socket
pub async fn discussion_socket(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(discussion_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    let hub = app_state.realtime.clone().ok_or_else(BackendError::unavailable)?;

    let detail = hub
        .store()
        .discussion_detail(discussion_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Discussion not found"))?;

    if !detail.has_user(user.user_id) {
        tracing::warn!(
            "[Realtime] User {} tried to subscribe to discussion {} without joining",
            user.user_id,
            discussion_id
        );
        return Err(BackendError::handler(
            StatusCode::FORBIDDEN,
            "Only participants can subscribe to this discussion",
        ));
    }

    tracing::info!(
        "[Realtime] User {} subscribing to discussion {}",
        user.user_id,
        discussion_id
    );

    let user_id = user.user_id;
    Ok(ws.on_upgrade(move |socket| serve_socket(hub, discussion_id, user_id, socket)))
}

/// Run the reader/writer pump for one upgraded socket until it closes
pub async fn serve_socket(hub: RealtimeHub, discussion_id: Uuid, user_id: Uuid, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (connection, mut outbound) = Connection::user_channel(user_id);
    let connection_id = connection.id();
    hub.subscribe(discussion_id, connection);

    let mut writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = sink.send(message).await {
                tracing::debug!("[Realtime] Socket {} send failed: {}", connection_id, e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    let reader_hub = hub.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => {
                    reader_hub
                        .handle_frame(discussion_id, connection_id, text.as_str())
                        .await
                }
                Message::Close(_) => break,
                // axum answers pings itself
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    tracing::info!(
        "[Realtime] Socket {} for discussion {} finished",
        connection_id,
        discussion_id
    );
}
