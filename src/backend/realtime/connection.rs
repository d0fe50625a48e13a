/**
 * WebSocket Connection Handle
 *
 * A `Connection` is the registry's view of one open WebSocket: an id and the
 * sending half of an unbounded channel. The socket task owns the receiving
 * half and forwards every queued frame to the socket sink, so frames reach a
 * client in the order they were queued.
 *
 * Sockets opened through the HTTP route also record the authenticated user,
 * so every socket of a user who leaves a discussion can be found again.
 *
 * When the socket task ends, the receiver is dropped. `Connection::closed`
 * resolves at that point, which is what the registry's close watcher awaits.
 */
use axum::extract::ws::Message;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sending half used to push frames to one client
pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// Receiving half drained by the socket writer task
pub type ConnectionReceiver = mpsc::UnboundedReceiver<Message>;

/// Opaque identifier of one WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while talking to a single connection
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The client side of the channel is gone
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}

/// Handle to one open client connection
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    user_id: Option<Uuid>,
    sender: ConnectionSender,
}

impl Connection {
    /// Wrap an existing sender
    pub fn new(sender: ConnectionSender) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id: None,
            sender,
        }
    }

    /// Create a connection together with the receiver that feeds its socket
    pub fn channel() -> (Self, ConnectionReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Like `channel`, for a socket opened by `user_id`
    pub fn user_channel(user_id: Uuid) -> (Self, ConnectionReceiver) {
        let (connection, receiver) = Self::channel();
        (
            Self {
                user_id: Some(user_id),
                ..connection
            },
            receiver,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Queue a frame for this client
    pub fn send(&self, message: Message) -> Result<(), RealtimeError> {
        self.sender
            .send(message)
            .map_err(|_| RealtimeError::ConnectionClosed(self.id))
    }

    /// Queue a text frame for this client
    pub fn send_text(&self, text: &str) -> Result<(), RealtimeError> {
        self.send(Message::Text(text.into()))
    }

    /// Whether the socket task has released its receiver
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the socket task has released its receiver
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_text_reaches_receiver() {
        let (connection, mut receiver) = Connection::channel();
        connection.send_text("hello").unwrap();

        match receiver.recv().await {
            Some(Message::Text(text)) => assert_eq!(text.as_str(), "hello"),
            other => panic!("Expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_fails() {
        let (connection, receiver) = Connection::channel();
        drop(receiver);

        assert!(connection.is_closed());
        assert!(matches!(
            connection.send_text("late"),
            Err(RealtimeError::ConnectionClosed(id)) if id == connection.id()
        ));
        // resolves immediately once the receiver is gone
        connection.closed().await;
    }

    #[test]
    fn test_user_channel_records_owner() {
        let user_id = Uuid::new_v4();
        let (connection, _receiver) = Connection::user_channel(user_id);
        assert_eq!(connection.user_id(), Some(user_id));
        assert_eq!(Connection::channel().0.user_id(), None);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
