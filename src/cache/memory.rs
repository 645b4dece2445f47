use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Cache;
use crate::event::Coverage;
use crate::utils::error::CacheError;

type Items = Option<HashMap<String, Coverage>>;

/// In-process [`Cache`] backed by a `HashMap` behind a `RwLock`.
///
/// `None` marks a closed cache.
#[derive(Debug)]
pub struct MemoryCache {
    items: RwLock<Items>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Some(HashMap::new())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Items> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Items> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Cache for MemoryCache {
    fn reset(&self, items: &[Coverage]) -> Result<(), CacheError> {
        // build outside the lock, swap inside it
        let fresh: HashMap<String, Coverage> = items
            .iter()
            .map(|cov| (cov.pkg.clone(), cov.clone()))
            .collect();

        let mut guard = self.write();
        match guard.as_mut() {
            Some(current) => {
                *current = fresh;
                Ok(())
            }
            None => Err(CacheError::Closed),
        }
    }

    fn get(&self, pkg: &str) -> Option<Coverage> {
        self.read().as_ref().and_then(|items| items.get(pkg).cloned())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self
            .read()
            .as_ref()
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    fn close(&self) -> Result<(), CacheError> {
        *self.write() = None;
        Ok(())
    }
}
