//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - JWT session validation
//! - `http` - axum REST routes
//! - `memory` - in-memory repositories
//! - `postgres` - sqlx repositories
//! - `stripe` - hosted checkout and webhook verification
//! - `websocket` - live order channels

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
pub mod websocket;
