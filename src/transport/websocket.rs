use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::accept_async;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::Broker;
use crate::event::{Event, Message};
use crate::roster::{self, Roster, SubscriptionId};
use crate::subscriber::{StreamWriter, Subscriber};
use crate::transport::message::{ClientMessage, ServerMessage};

/// State of one streaming connection.
///
/// Every subscription gets a child of the session's cancellation token, so
/// closing the session (or shutting the server down) releases them all and
/// an unsubscribe releases just the one.
pub struct Session {
    client_id: String,
    writer: Arc<dyn Subscriber>,
    broker: Arc<dyn Broker>,
    roster: Arc<dyn Roster>,
    subscriptions: Vec<(String, SubscriptionId, CancellationToken)>,
    token: CancellationToken,
}

impl Session {
    pub fn new(
        client_id: String,
        sender: UnboundedSender<WsMessage>,
        broker: Arc<dyn Broker>,
        roster: Arc<dyn Roster>,
        shutdown: &CancellationToken,
    ) -> Self {
        let writer: Arc<dyn Subscriber> = Arc::new(StreamWriter::new(client_id.clone(), sender));
        Self {
            client_id,
            writer,
            broker,
            roster,
            subscriptions: Vec::new(),
            token: shutdown.child_token(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Applies one client request and returns the reply to send, if any.
    pub async fn handle(&mut self, msg: ClientMessage) -> Option<ServerMessage> {
        match msg {
            ClientMessage::Subscribe { event } => Some(self.subscribe(&event)),
            ClientMessage::Unsubscribe { event } => Some(self.unsubscribe(&event)),
            ClientMessage::Publish { name, payload } => {
                let Some(message) = Message::try_new(&name, payload) else {
                    return Some(error("event name cannot be empty"));
                };
                match self.broker.publish(Event::Message(message)).await {
                    Ok(()) => {
                        debug!(client = %self.client_id, event = %name, "published");
                        None
                    }
                    Err(e) => Some(error(&e.to_string())),
                }
            }
        }
    }

    fn subscribe(&mut self, event: &str) -> ServerMessage {
        match self.roster.subscribe(event, &self.writer) {
            Ok(Some(id)) => {
                let token = self.token.child_token();
                tokio::spawn(roster::watch(self.roster.clone(), id.clone(), token.clone()));
                self.subscriptions.push((event.to_string(), id.clone(), token));
                info!(client = %self.client_id, subscription = %id, "stream subscribed");
                ServerMessage::Subscribed { id }
            }
            Ok(None) => error("event name cannot be empty"),
            Err(e) => error(&e.to_string()),
        }
    }

    fn unsubscribe(&mut self, event: &str) -> ServerMessage {
        let (matching, kept): (Vec<_>, Vec<_>) = self
            .subscriptions
            .drain(..)
            .partition(|(name, _, _)| name == event);
        self.subscriptions = kept;

        for (_, id, token) in &matching {
            if let Err(e) = self.roster.unsubscribe(id) {
                warn!(client = %self.client_id, subscription = %id, error = %e, "failed to unsubscribe");
            }
            // ends the watch task for this subscription
            token.cancel();
        }

        ServerMessage::Unsubscribed {
            event: event.to_string(),
            removed: matching.len(),
        }
    }

    /// Releases every subscription held by this session.
    pub fn close(self) {
        self.token.cancel();
    }
}

fn error(message: &str) -> ServerMessage {
    ServerMessage::Error {
        message: message.to_string(),
    }
}

fn send_frame(sender: &UnboundedSender<WsMessage>, frame: &ServerMessage) {
    match serde_json::to_string(frame) {
        Ok(text) => {
            let _ = sender.send(WsMessage::text(text));
        }
        Err(e) => warn!(error = %e, "failed to serialize server message"),
    }
}

/// Binds `addr` and serves streaming clients until `shutdown` is cancelled.
pub async fn start_websocket_server(
    addr: &str,
    broker: Arc<dyn Broker>,
    roster: Arc<dyn Roster>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    serve(listener, broker, roster, shutdown).await;
    Ok(())
}

/// Accept loop over an already bound listener.
pub async fn serve(
    listener: TcpListener,
    broker: Arc<dyn Broker>,
    roster: Arc<dyn Roster>,
    shutdown: CancellationToken,
) {
    loop {
        let stream = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            },
        };

        tokio::spawn(handle_connection(
            stream,
            broker.clone(),
            roster.clone(),
            shutdown.clone(),
        ));
    }

    info!("WebSocket server stopped");
}

async fn handle_connection(
    stream: TcpStream,
    broker: Arc<dyn Broker>,
    roster: Arc<dyn Roster>,
    shutdown: CancellationToken,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(error = %e, "WebSocket handshake error");
            return;
        }
    };

    let client_id = format!("client-{}", Uuid::new_v4());
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let mut session = Session::new(client_id.clone(), tx.clone(), broker, roster, &shutdown);
    info!(client = %client_id, "connected");

    // forward queued frames (replies and events) to the socket
    let send_loop = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    debug!(client = %client_id, error = %e, "failed to send message");
                    break;
                }
            }
            debug!(client = %client_id, "send loop closed");
        })
    };

    loop {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = ws_receiver.next() => match next {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    debug!(client = %client_id, error = %e, "receive failed");
                    break;
                }
                None => break,
            },
        };

        if msg.is_close() {
            break;
        }
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };

        let reply = match serde_json::from_str::<ClientMessage>(text) {
            Ok(request) => session.handle(request).await,
            Err(err) => {
                warn!(
                    client = %client_id,
                    error = %err,
                    "invalid client message: {}",
                    text.chars().take(100).collect::<String>()
                );
                Some(error("invalid message"))
            }
        };
        if let Some(reply) = reply {
            send_frame(&tx, &reply);
        }
    }

    session.close();
    drop(tx);
    send_loop.abort();
    info!(client = %client_id, "disconnected");
}
