use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::event::Event;

/// Receiving end of one broker registration.
///
/// Dropping the listener unregisters it lazily: the broker prunes it on the
/// next publish.
#[derive(Debug)]
pub struct Listener {
    id: Uuid,
    receiver: mpsc::Receiver<Arc<Event>>,
}

impl Listener {
    pub(crate) fn new(id: Uuid, receiver: mpsc::Receiver<Arc<Event>>) -> Self {
        Self { id, receiver }
    }

    /// A listener whose stream has already ended.
    pub(crate) fn closed() -> Self {
        let (_, receiver) = mpsc::channel(1);
        Self {
            id: Uuid::nil(),
            receiver,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Waits for the next event; `None` once the broker is closed and every
    /// queued event has been received.
    ///
    /// Cancel safe, so it can be raced in `tokio::select!`.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        self.receiver.recv().await
    }

    /// Takes an already queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<Event>> {
        self.receiver.try_recv().ok()
    }
}
