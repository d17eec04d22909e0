//! HTTP adapter for orders.
//!
//! - `GET /api/v1/orders/current?tableId=` - Current order of a table
//! - `GET /api/v1/orders/:order_id` - Order view
//! - `PATCH /api/v1/orders/:order_id` - Status and tip
//! - `POST|DELETE /api/v1/orders/:order_id/items` - Items
//! - `POST|DELETE /api/v1/orders/:order_id/waiters` - Waiter assignments

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::order_routes;
