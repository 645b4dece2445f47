//! Broker engine
//!
//! This module contains the in-memory broker implementation responsible for:
//! - registering listener endpoints (one bounded queue each)
//! - handing every published event to all registered endpoints
//! - closing all endpoints on shutdown
//!
//! Concurrency and usage notes:
//! - The registry sits behind a `tokio::sync::Mutex` that `listen`, `publish`
//!   and `close` each hold for their whole duration. Publishes are therefore
//!   serialized, which is what keeps per-listener order equal to publish
//!   order, and `close` waits for any publish already handing off events.
//! - Within one publish, the hand-offs to the individual endpoints run
//!   concurrently; a full queue only delays its own endpoint. With a
//!   `delivery_timeout` configured, a hand-off that cannot complete in time
//!   drops the event for that endpoint alone.
//! - Endpoints whose [`Listener`] was dropped are pruned during publish.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Broker, Listener};
use crate::config::BrokerSettings;
use crate::event::Event;
use crate::utils::error::BrokerError;

#[derive(Debug)]
struct Endpoint {
    id: Uuid,
    sender: mpsc::Sender<Arc<Event>>,
}

#[derive(Debug, Default)]
struct Registry {
    endpoints: Vec<Endpoint>,
    closed: bool,
}

enum Delivery {
    Delivered,
    Disconnected,
    TimedOut,
}

#[derive(Debug)]
pub struct MemoryBroker {
    registry: Mutex<Registry>,
    pub(super) capacity: usize,
    pub(super) delivery_timeout: Option<Duration>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    /// Queue length of each endpoint unless configured otherwise.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Broker with default queue length and no delivery timeout.
    pub fn new() -> Self {
        Self::with_options(Self::DEFAULT_CAPACITY, None)
    }

    /// The capacity is clamped to at least 1.
    pub fn with_options(capacity: usize, delivery_timeout: Option<Duration>) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            capacity: capacity.max(1),
            delivery_timeout,
        }
    }

    /// A `delivery_timeout_ms` of 0 disables the timeout.
    pub fn from_settings(settings: &BrokerSettings) -> Self {
        let timeout = (settings.delivery_timeout_ms > 0)
            .then(|| Duration::from_millis(settings.delivery_timeout_ms));
        Self::with_options(settings.listener_capacity, timeout)
    }

    pub async fn listener_count(&self) -> usize {
        self.registry.lock().await.endpoints.len()
    }

    pub async fn is_closed(&self) -> bool {
        self.registry.lock().await.closed
    }
}

async fn deliver(
    sender: &mpsc::Sender<Arc<Event>>,
    event: Arc<Event>,
    timeout: Option<Duration>,
) -> Delivery {
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, sender.send(event)).await {
            Ok(result) => result,
            Err(_) => return Delivery::TimedOut,
        },
        None => sender.send(event).await,
    };

    match result {
        Ok(()) => Delivery::Delivered,
        Err(_) => Delivery::Disconnected,
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn listen(&self) -> Result<Listener, BrokerError> {
        let mut registry = self.registry.lock().await;
        if registry.closed {
            debug!("listen on closed broker, returning finished listener");
            return Ok(Listener::closed());
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = Uuid::new_v4();
        registry.endpoints.push(Endpoint { id, sender });
        debug!(listener = %id, listeners = registry.endpoints.len(), "listener registered");

        Ok(Listener::new(id, receiver))
    }

    async fn publish(&self, event: Event) -> Result<(), BrokerError> {
        let mut registry = self.registry.lock().await;
        if registry.closed {
            debug!(event = event.name(), "publish on closed broker ignored");
            return Ok(());
        }
        if registry.endpoints.is_empty() {
            debug!(event = event.name(), "no listeners, event dropped");
            return Ok(());
        }

        let event = Arc::new(event);
        let timeout = self.delivery_timeout;
        let outcomes = join_all(registry.endpoints.iter().map(|endpoint| {
            let event = Arc::clone(&event);
            async move { (endpoint.id, deliver(&endpoint.sender, event, timeout).await) }
        }))
        .await;

        let mut disconnected = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Delivery::Delivered => {}
                Delivery::Disconnected => disconnected.push(id),
                Delivery::TimedOut => {
                    warn!(listener = %id, event = event.name(), "delivery timed out, event dropped for listener");
                }
            }
        }

        if !disconnected.is_empty() {
            registry
                .endpoints
                .retain(|endpoint| !disconnected.contains(&endpoint.id));
            debug!(pruned = disconnected.len(), "removed dropped listeners");
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut registry = self.registry.lock().await;
        let released = registry.endpoints.len();
        // dropping the senders ends every listener's stream
        registry.endpoints.clear();

        if !registry.closed {
            registry.closed = true;
            info!(listeners = released, "broker closed");
        }
        Ok(())
    }
}
