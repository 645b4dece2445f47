use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Identity, Subscriber};
use crate::event::Event;
use crate::utils::error::{BrokerError, NotifyError};

/// Subscriber that remembers every event it was notified with.
#[derive(Default)]
pub(crate) struct Recorder {
    identity: Identity,
    events: Mutex<Vec<Event>>,
    fail: bool,
}

impl Recorder {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A recorder whose `notify` records the event and then reports failure.
    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Polls until at least `count` events arrived or two seconds passed.
    pub(crate) async fn wait_for(&self, count: usize) -> Vec<Event> {
        for _ in 0..200 {
            let events = self.events();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl Subscriber for Recorder {
    fn id(&self) -> String {
        self.identity.get()
    }

    fn set_id(&self, id: &str) {
        self.identity.set(id);
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(NotifyError::Broker(BrokerError::Unavailable(
                "recorder told to fail".to_string(),
            )));
        }
        Ok(())
    }
}
