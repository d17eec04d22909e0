//! Dining Orders - order lifecycle and realtime table sync for restaurant dining
//!
//! Guests at a table share one current order. Items are added and removed
//! while the order is open, waiters lock and settle it, and every change is
//! pushed to the table's WebSocket subscribers. Payment goes through a hosted
//! checkout whose webhook records the payment and completes the order.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
