//! The `cache` module keeps the latest coverage per package in memory, for
//! fast lookups by the query endpoints.
//!
//! It is written by [`CacheWriter`](crate::subscriber::CacheWriter) and read
//! by the web layer.

mod memory;

pub use memory::MemoryCache;

use crate::event::Coverage;
use crate::utils::error::CacheError;

/// Fast lookup store for coverage data.
pub trait Cache: Send + Sync {
    /// Drops everything stored and replaces it with `items`, keyed by package.
    fn reset(&self, items: &[Coverage]) -> Result<(), CacheError>;

    fn get(&self, pkg: &str) -> Option<Coverage>;

    /// Package names currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>, CacheError>;

    fn close(&self) -> Result<(), CacheError>;
}
