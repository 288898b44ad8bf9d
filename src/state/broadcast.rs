use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::{
    dto::{sse::ServerEvent, ws::ServerMessage},
    state::session::ConnectionId,
};

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}

/// Fan-out of draft notifications: every WebSocket client plus the public SSE hub.
pub struct Broadcaster {
    public: SseHub,
    clients: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

impl Broadcaster {
    /// Create a broadcaster whose SSE channel buffers `sse_capacity` events.
    pub fn new(sse_capacity: usize) -> Self {
        Self {
            public: SseHub::new(sse_capacity),
            clients: DashMap::new(),
        }
    }

    /// Start delivering messages to a WebSocket writer.
    pub fn register(&self, connection: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.clients.insert(connection, tx);
    }

    /// Stop delivering to a connection.
    pub fn unregister(&self, connection: ConnectionId) {
        self.clients.remove(&connection);
    }

    /// Number of registered WebSocket connections.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Hub backing `/sse/public`.
    pub fn public_sse(&self) -> &SseHub {
        &self.public
    }

    /// Deliver `message` to one connection. Returns `false` when it is gone.
    pub fn send_to(&self, connection: ConnectionId, message: &ServerMessage) -> bool {
        let Some(payload) = encode(message) else {
            return false;
        };
        let Some(client) = self.clients.get(&connection) else {
            debug!(%connection, kind = message.kind(), "dropping message for unknown connection");
            return false;
        };
        client.send(Message::Text(payload.into())).is_ok()
    }

    /// Ask every WebSocket writer to send a close frame. Each socket task then unregisters
    /// itself when its client answers or the connection drops.
    pub fn close_all(&self) {
        for client in self.clients.iter() {
            let _ = client.value().send(Message::Close(None));
        }
        debug!(clients = self.clients.len(), "close requested for every connection");
    }

    /// Deliver `message` to every connection and to the public SSE stream.
    pub fn broadcast(&self, message: &ServerMessage) {
        let Some(payload) = encode(message) else {
            return;
        };
        for client in self.clients.iter() {
            // A closed writer is cleaned up by its own socket task.
            let _ = client.value().send(Message::Text(payload.clone().into()));
        }
        self.public.broadcast(ServerEvent::encoded(message, payload));
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!(error = %err, kind = message.kind(), "failed to serialize message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{dto::ws::AdminLoginOutcome, error::DraftError};

    fn text(message: Message) -> serde_json::Value {
        match message {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn broadcast_reaches_sockets_and_sse() {
        let broadcaster = Broadcaster::new(4);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sse = broadcaster.public_sse().subscribe();
        broadcaster.register(Uuid::new_v4(), tx);

        broadcaster.broadcast(&ServerMessage::rejected(&DraftError::DraftCompleted));

        assert_eq!(text(rx.try_recv().unwrap())["type"], "operation_rejected");
        let event = sse.try_recv().unwrap();
        assert_eq!(event.event, "operation_rejected");
    }

    #[test]
    fn targeted_send_only_reaches_its_connection() {
        let broadcaster = Broadcaster::new(4);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = Uuid::new_v4();
        broadcaster.register(a, tx_a);
        broadcaster.register(Uuid::new_v4(), tx_b);

        let outcome = ServerMessage::AdminLoginOutcome(AdminLoginOutcome { success: true });
        assert!(broadcaster.send_to(a, &outcome));
        assert_eq!(text(rx_a.try_recv().unwrap())["payload"]["success"], true);
        assert!(rx_b.try_recv().is_err());

        broadcaster.unregister(a);
        assert!(!broadcaster.send_to(a, &outcome));
        assert_eq!(broadcaster.client_count(), 1);
    }

    #[test]
    fn close_all_sends_a_close_frame_to_each_socket() {
        let broadcaster = Broadcaster::new(4);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        broadcaster.register(Uuid::new_v4(), tx_a);
        broadcaster.register(Uuid::new_v4(), tx_b);

        broadcaster.close_all();

        assert!(matches!(rx_a.try_recv(), Ok(Message::Close(None))));
        assert!(matches!(rx_b.try_recv(), Ok(Message::Close(None))));
    }
}
