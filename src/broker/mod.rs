//! The `broker` module is the in-process event bus.
//!
//! Every call to [`Broker::listen`] registers a delivery endpoint; every
//! [`Broker::publish`] hands the event to all endpoints registered at that
//! moment. In practice the only listener is the dispatch loop, which turns
//! deliveries into roster-resolved subscriber notifications.
//!
//! ```text
//!  publisher ──► publish(ev) ──┬──► [queue L1] ──► Listener 1 (dispatch loop)
//!                              ├──► [queue L2] ──► Listener 2
//!                              └──► [queue LN] ──► Listener N
//! ```

pub mod engine;
mod listener;

pub use engine::MemoryBroker;
pub use listener::Listener;

use async_trait::async_trait;

use crate::event::Event;
use crate::utils::error::BrokerError;

/// Fan-out event bus.
///
/// Once closed, `listen` yields an already finished listener and `publish`
/// does nothing; both still return `Ok`.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Registers a new endpoint that yields every event published after this
    /// call returns, in publish order.
    async fn listen(&self) -> Result<Listener, BrokerError>;

    /// Hands `event` to every currently registered endpoint and returns once
    /// all hand-offs have finished.
    async fn publish(&self, event: Event) -> Result<(), BrokerError>;

    /// Ends every endpoint's stream and forgets them. Safe to call repeatedly.
    async fn close(&self) -> Result<(), BrokerError>;
}
