//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every handler re-reads the order after writing, so callers always see
//! the repository's state rather than a locally computed one.

pub mod handlers;

pub use handlers::*;
