use std::sync::Arc;

use async_trait::async_trait;

use super::{Identity, Subscriber};
use crate::cache::Cache;
use crate::event::Event;
use crate::utils::error::NotifyError;

/// Replaces the cache contents with the coverage of each GitHub event.
pub struct CacheWriter {
    identity: Identity,
    cache: Arc<dyn Cache>,
}

impl CacheWriter {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            identity: Identity::default(),
            cache,
        }
    }
}

#[async_trait]
impl Subscriber for CacheWriter {
    fn id(&self) -> String {
        self.identity.get()
    }

    fn set_id(&self, id: &str) {
        self.identity.set(id);
    }

    async fn notify(&self, event: &Event) -> Result<(), NotifyError> {
        match event {
            Event::Github(ev) => Ok(self.cache.reset(&ev.coverage)?),
            _ => Err(NotifyError::unsupported(event)),
        }
    }
}
