//! The `error` module defines the error types used within `covbus`.
//!
//! Every collaborator gets its own enum so callers can tell a broker failure
//! from a repo failure without string matching. Subscribers fold all of them
//! into [`NotifyError`], which is what the dispatch loop logs.

use thiserror::Error;

/// Errors raised by a [`Broker`](crate::broker::Broker) implementation.
///
/// The in-memory broker never produces these; they exist for brokers backed
/// by something that can actually go away.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a [`Roster`](crate::roster::Roster) implementation.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("failed to encode coverage record: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("smtp transport error: {0}")]
    Transport(String),

    #[error("email task failed: {0}")]
    Task(String),
}

/// Failure reported by a subscriber for a single notification.
///
/// The dispatch loop logs these and carries on with the remaining
/// subscribers; none of them is fatal.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The subscriber does not handle this kind of event.
    #[error("event {kind} ({name}) is not supported by this subscriber")]
    UnsupportedEvent { name: String, kind: &'static str },

    #[error("email recipient cannot be empty")]
    EmptyRecipient,

    #[error("stream client disconnected")]
    StreamClosed,

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl NotifyError {
    pub fn unsupported(event: &crate::event::Event) -> Self {
        NotifyError::UnsupportedEvent {
            name: event.name().to_string(),
            kind: event.kind(),
        }
    }
}

/// Rejections produced while ingesting a webhook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("request incomplete")]
    Incomplete,

    #[error("payload could not be verified")]
    Unverified,

    #[error(transparent)]
    Broker(#[from] BrokerError),
}
