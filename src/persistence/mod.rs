//! The `persistence` module stores coverage data durably so the cache can be
//! primed again after a restart.
//!
//! It uses `sled` as an embedded key-value store. Each save replaces the whole
//! snapshot: only the latest CI run's coverage is kept.

pub mod sled_store;

pub use sled_store::SledRepo;

use crate::event::Coverage;
use crate::utils::error::RepoError;

/// Durable storage of the latest coverage snapshot.
pub trait Repo: Send + Sync {
    fn save(&self, items: &[Coverage]) -> Result<(), RepoError>;

    fn load(&self) -> Result<Vec<Coverage>, RepoError>;

    fn close(&self) -> Result<(), RepoError>;
}
