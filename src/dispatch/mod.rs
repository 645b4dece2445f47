//! The `dispatch` module bridges a [`Broker`] to a [`Roster`].
//!
//! [`attach`] listens on the broker and, for every event received, asks the
//! roster who subscribed to that event's name and notifies each of them.
//!
//! ```text
//! Broker ──► Listener ──► attach loop ──► roster.subscribers(name)
//!                              │
//!                              └──► spawned batch ──► join_all(notify)
//!                                                     ├─► sub 1
//!                                                     ├─► sub 2
//!                                                     └─► sub N
//! ```
//!
//! ## Rules
//! - The loop never waits on subscribers: each event's notifications run as
//!   their own task, so a subscriber publishing back to the broker cannot
//!   stall the listener it is feeding.
//! - A failed roster lookup skips that event; a failed notification is
//!   logged and does not affect its siblings.
//! - On exit (broker closed or shutdown requested) the listener is dropped,
//!   the broker is closed and in-flight notifications are awaited.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::broker::Broker;
use crate::event::Event;
use crate::roster::Roster;
use crate::subscriber::Subscriber;
use crate::utils::error::BrokerError;

/// Runs the dispatch loop until the broker closes or `shutdown` is cancelled.
///
/// # Errors
///
/// Only if the broker refuses to register a listener; everything after that
/// is logged and survived.
pub async fn attach(
    broker: Arc<dyn Broker>,
    roster: Arc<dyn Roster>,
    shutdown: CancellationToken,
) -> Result<(), BrokerError> {
    let mut listener = broker.listen().await.inspect_err(|e| {
        error!(error = %e, "dispatch failed to listen on broker");
    })?;
    let mut inflight: JoinSet<usize> = JoinSet::new();
    info!(listener = %listener.id(), "dispatch attached");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("dispatch cancelled");
                break;
            }
            received = listener.recv() => {
                let Some(event) = received else {
                    info!("broker closed, dispatch stopping");
                    break;
                };

                match roster.subscribers(event.name()) {
                    Ok(subscribers) if subscribers.is_empty() => {
                        debug!(event = event.name(), "no subscribers");
                    }
                    Ok(subscribers) => {
                        inflight.spawn(notify_all(event, subscribers));
                    }
                    Err(e) => {
                        error!(event = event.name(), error = %e, "failed to get subscribers, event skipped");
                    }
                }
            }
            Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "notification batch aborted");
                }
            }
        }
    }

    // nothing may stay blocked handing events to a listener nobody reads
    drop(listener);
    if let Err(e) = broker.close().await {
        warn!(error = %e, "failed to close broker");
    }

    while let Some(joined) = inflight.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "notification batch aborted");
        }
    }
    info!("dispatch detached");
    Ok(())
}

/// Notifies every subscriber of `event` concurrently.
///
/// Returns how many notifications failed. Failures are logged here.
pub async fn notify_all(event: Arc<Event>, subscribers: Vec<Arc<dyn Subscriber>>) -> usize {
    let results = join_all(subscribers.iter().map(|sub| sub.notify(&event))).await;

    let mut failed = 0;
    for (sub, result) in subscribers.iter().zip(results) {
        if let Err(e) = result {
            failed += 1;
            warn!(
                subscriber = %sub.id(),
                event = event.name(),
                error = %e,
                "failed to notify subscriber"
            );
        }
    }

    debug!(
        event = event.name(),
        notified = subscribers.len() - failed,
        failed,
        "event dispatched"
    );
    failed
}
