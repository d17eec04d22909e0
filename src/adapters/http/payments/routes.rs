//! Axum router for payment endpoints.

use axum::{routing::post, Router};

use crate::adapters::http::state::AppState;

use super::handlers::{create_checkout, handle_payment_webhook};

/// Create the payment API router.
///
/// # Routes
///
/// - `POST /orders/:order_id/payments` - Open a checkout session
/// - `POST /payments/webhook` - Provider webhook (signature verified, no user auth)
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/:order_id/payments", post(create_checkout))
        .route("/payments/webhook", post(handle_payment_webhook))
}
