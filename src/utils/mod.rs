//! The `utils` module provides shared definitions used across `covbus`:
//! the error types of every collaborator and the logging bootstrap.

pub mod error;
pub mod logging;
