//! The `roster` module keeps track of which subscribers care about which
//! event names, and mints the subscription ids they are known by.
//!
//! Ids have the form `<event-name>-<counter>`. The counter belongs to one
//! roster instance and only ever grows, so an id is never handed out twice,
//! even after it has been unsubscribed. Removal goes through a side table
//! from id to event name; the id string is never parsed.

mod memory;
pub mod topic;

pub use memory::MemoryRoster;
pub use topic::SubscriptionId;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::subscriber::Subscriber;
use crate::utils::error::RosterError;

/// Registry of subscribers keyed by event name.
///
/// Malformed input is not an error here: an empty name or an unknown id is a
/// silent no-op.
pub trait Roster: Send + Sync {
    /// Registers `subscriber` under `name` and hands it its new id through
    /// [`Subscriber::set_id`]. Returns `None` when `name` is empty.
    ///
    /// The roster keeps only a weak reference; whoever created the
    /// subscriber keeps it alive.
    fn subscribe(
        &self,
        name: &str,
        subscriber: &Arc<dyn Subscriber>,
    ) -> Result<Option<SubscriptionId>, RosterError>;

    /// Removes a subscription. Unknown ids are ignored, so this is idempotent.
    fn unsubscribe(&self, id: &str) -> Result<(), RosterError>;

    /// Snapshot of the subscribers registered under `name`; empty for names
    /// nobody subscribed to.
    fn subscribers(&self, name: &str) -> Result<Vec<Arc<dyn Subscriber>>, RosterError>;

    /// Drops every registration. Ids issued later still never repeat earlier ones.
    fn close(&self) -> Result<(), RosterError>;
}

/// Unsubscribes `id` once `token` is cancelled.
///
/// Ties a subscription to the lifetime of whatever owns the token, such as
/// a streaming client connection.
pub async fn watch(roster: Arc<dyn Roster>, id: SubscriptionId, token: CancellationToken) {
    token.cancelled().await;

    match roster.unsubscribe(&id) {
        Ok(()) => debug!(subscription = %id, "subscription released"),
        Err(e) => warn!(subscription = %id, error = %e, "failed to release subscription"),
    }
}

#[cfg(test)]
mod tests;
