use std::sync::Arc;

use async_trait::async_trait;

use super::{Identity, Subscriber};
use crate::broker::Broker;
use crate::event::Event;
use crate::utils::error::NotifyError;

/// Splits a GitHub event into one coverage event per package and publishes
/// them back onto the broker.
///
/// Publishing stops at the first broker failure; records already published
/// stay published.
pub struct CoverageSplitter {
    identity: Identity,
    broker: Arc<dyn Broker>,
}

impl CoverageSplitter {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self {
            identity: Identity::default(),
            broker,
        }
    }
}

#[async_trait]
impl Subscriber for CoverageSplitter {
    fn id(&self) -> String {
        self.identity.get()
    }

    fn set_id(&self, id: &str) {
        self.identity.set(id);
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        let Event::Github(ev) = event else {
            return Err(NotifyError::unsupported(event));
        };

        for cov in &ev.coverage {
            self.broker.publish(Event::Coverage(cov.clone())).await?;
        }
        Ok(())
    }
}
