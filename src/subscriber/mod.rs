//! The `subscriber` module defines who receives events once the dispatch
//! loop has resolved them through the roster.
//!
//! A [`Subscriber`] can be identified (the roster hands it its subscription
//! id through [`Subscriber::set_id`]) and notified. Each concrete variant
//! handles the event kinds it understands and returns
//! [`NotifyError::UnsupportedEvent`] for the rest.
//!
//! - `RepoWriter`: persists GitHub coverage through a [`Repo`](crate::persistence::Repo).
//! - `CacheWriter`: refreshes a [`Cache`](crate::cache::Cache) with GitHub coverage.
//! - `CoverageSplitter`: republishes every coverage record as its own event.
//! - `EmailNotifier`: mails any event to one recipient.
//! - `StreamWriter`: pushes any event to a connected websocket client.

mod cache;
mod coverage;
mod email;
mod repo;
mod stream;

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::event::Event;
use crate::utils::error::NotifyError;

pub use cache::CacheWriter;
pub use coverage::CoverageSplitter;
pub use email::EmailNotifier;
pub use repo::RepoWriter;
pub use stream::StreamWriter;

/// Something identifiable that wants to hear about events.
///
/// `notify` is awaited from a dispatch task, concurrently with the other
/// subscribers of the same event; a slow or failing subscriber only delays
/// or fails itself.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// The subscription id last assigned by a roster, empty until then.
    fn id(&self) -> String;

    fn set_id(&self, id: &str);

    async fn notify(&self, event: &Event) -> Result<(), NotifyError>;
}

/// Interior-mutable subscription id shared by the subscriber variants.
#[derive(Debug, Default)]
pub struct Identity {
    id: RwLock<String>,
}

impl Identity {
    pub fn get(&self) -> String {
        self.id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, id: &str) {
        *self.id.write().unwrap_or_else(PoisonError::into_inner) = id.to_string();
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;
