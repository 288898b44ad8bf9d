use crate::dto::ws::ServerMessage;

/// One frame of the public SSE stream: the WebSocket JSON body, named after its type.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// Event name, the message `type`.
    pub event: &'static str,
    /// JSON body.
    pub data: String,
}

impl ServerEvent {
    /// Encode `message` the same way it goes out over WebSocket.
    pub fn from_message(message: &ServerMessage) -> serde_json::Result<Self> {
        Ok(Self::encoded(message, serde_json::to_string(message)?))
    }

    /// Wrap a body that was already serialized for WebSocket clients.
    pub fn encoded(message: &ServerMessage, data: String) -> Self {
        Self {
            event: message.kind(),
            data,
        }
    }
}
