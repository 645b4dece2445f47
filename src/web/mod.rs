//! The `web` module is the HTTP face of covbus.
//!
//! CI pipelines post signed test reports to `/github`; the hook extracts the
//! coverage lines and publishes them as a GitHub event. The `/api` routes
//! answer coverage queries from the cache.

pub mod hook;
pub mod payload;
pub mod server;
pub mod signature;

pub use hook::{Hook, HookOutcome};
pub use server::{WebState, router, start_web_server};
