use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::subscriber::Subscriber;

pub type SubscriptionId = String;

/// Subscriptions registered under one event name.
///
/// The topic does not own its subscribers: it keeps `Weak` references and
/// forgets entries whose subscriber has been dropped when they are next
/// looked up.
#[derive(Default)]
pub struct Topic {
    pub name: String,
    subscribers: HashMap<SubscriptionId, Weak<dyn Subscriber>>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, id: SubscriptionId, subscriber: Weak<dyn Subscriber>) {
        self.subscribers.insert(id, subscriber);
    }

    /// Returns whether `id` was registered here.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Snapshot of the subscribers still alive, plus the ids that were
    /// dropped from the topic because their subscriber is gone.
    pub fn live(&mut self) -> (Vec<Arc<dyn Subscriber>>, Vec<SubscriptionId>) {
        let mut alive = Vec::with_capacity(self.subscribers.len());
        let mut gone = Vec::new();

        self.subscribers.retain(|id, weak| match weak.upgrade() {
            Some(subscriber) => {
                alive.push(subscriber);
                true
            }
            None => {
                gone.push(id.clone());
                false
            }
        });

        (alive, gone)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
