use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

use super::{Identity, Subscriber};
use crate::event::Event;
use crate::transport::message::ServerMessage;
use crate::utils::error::NotifyError;

/// Forwards events to a connected websocket client.
///
/// Each event is serialized as a `ServerMessage::Event` frame and queued on
/// the client's outbound channel; the connection's send loop writes it out.
#[derive(Debug)]
pub struct StreamWriter {
    identity: Identity,

    /// Connection id, used in logs.
    client_id: String,

    /// Channel to send WebSocket messages to the client.
    sender: UnboundedSender<WsMessage>,
}

impl StreamWriter {
    pub fn new(client_id: impl Into<String>, sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            identity: Identity::default(),
            client_id: client_id.into(),
            sender,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

#[async_trait]
impl Subscriber for StreamWriter {
    fn id(&self) -> String {
        self.identity.get()
    }

    fn set_id(&self, id: &str) {
        self.identity.set(id);
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        let frame = ServerMessage::Event {
            name: event.name().to_string(),
            data: event.to_string(),
        };
        let text = serde_json::to_string(&frame)?;
        self.sender
            .send(WsMessage::text(text))
            .map_err(|_| NotifyError::StreamClosed)
    }
}
