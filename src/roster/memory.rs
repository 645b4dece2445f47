use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::Roster;
use super::topic::{SubscriptionId, Topic};
use crate::subscriber::Subscriber;
use crate::utils::error::RosterError;

#[derive(Default)]
struct Registry {
    /// Last id handed out; shared by every event name, never reset.
    counter: u64,
    topics: HashMap<String, Topic>,
    /// Which event name each live subscription id belongs to.
    names: HashMap<SubscriptionId, String>,
}

/// In-process [`Roster`].
///
/// Every operation, lookups included, holds the same registry lock for its
/// whole duration.
#[derive(Default)]
pub struct MemoryRoster {
    registry: Mutex<Registry>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of subscriptions registered under `name`, live or not.
    pub fn count(&self, name: &str) -> usize {
        self.lock().topics.get(name).map_or(0, Topic::len)
    }
}

impl Roster for MemoryRoster {
    fn subscribe(
        &self,
        name: &str,
        subscriber: &Arc<dyn Subscriber>,
    ) -> Result<Option<SubscriptionId>, RosterError> {
        if name.is_empty() {
            return Ok(None);
        }

        let mut registry = self.lock();
        registry.counter += 1;
        let id = format!("{name}-{}", registry.counter);

        registry
            .topics
            .entry(name.to_string())
            .or_insert_with(|| Topic::new(name))
            .subscribe(id.clone(), Arc::downgrade(subscriber));
        registry.names.insert(id.clone(), name.to_string());
        subscriber.set_id(&id);

        debug!(subscription = %id, event = name, "subscribed");
        Ok(Some(id))
    }

    fn unsubscribe(&self, id: &str) -> Result<(), RosterError> {
        let mut registry = self.lock();
        let Some(name) = registry.names.remove(id) else {
            return Ok(());
        };

        if let Some(topic) = registry.topics.get_mut(&name) {
            topic.unsubscribe(id);
            if topic.is_empty() {
                registry.topics.remove(&name);
            }
        }

        debug!(subscription = %id, event = %name, "unsubscribed");
        Ok(())
    }

    fn subscribers(&self, name: &str) -> Result<Vec<Arc<dyn Subscriber>>, RosterError> {
        let mut registry = self.lock();
        let Some(topic) = registry.topics.get_mut(name) else {
            return Ok(Vec::new());
        };

        let (alive, gone) = topic.live();
        let now_empty = topic.is_empty();

        if now_empty {
            registry.topics.remove(name);
        }
        if !gone.is_empty() {
            for id in &gone {
                registry.names.remove(id);
            }
            debug!(event = name, pruned = gone.len(), "forgot dropped subscribers");
        }

        Ok(alive)
    }

    fn close(&self) -> Result<(), RosterError> {
        let mut registry = self.lock();
        registry.topics.clear();
        registry.names.clear();
        Ok(())
    }
}
