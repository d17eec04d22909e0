//! HTTP adapter for payments.
//!
//! - `POST /api/v1/orders/:order_id/payments` - Hosted checkout session
//! - `POST /api/v1/payments/webhook` - Provider success webhook

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::payment_routes;
