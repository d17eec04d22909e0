//! Axum router for order endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    add_item, assign_waiter, delete_item, get_current_order, get_order, remove_waiter,
    update_order,
};

/// Create the order API router.
///
/// # Routes
///
/// - `GET /orders/current?tableId=` - Current order of a table
/// - `GET /orders/:order_id` - Order view
/// - `PATCH /orders/:order_id` - Status/tip update (anonymous callers may only lock)
/// - `POST /orders/:order_id/items` - Add a menu item
/// - `DELETE /orders/:order_id/items` - Remove an order line
/// - `POST /orders/:order_id/waiters` - Assign the caller (auth required)
/// - `DELETE /orders/:order_id/waiters` - Remove an assignment (auth required)
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/current", get(get_current_order))
        .route("/orders/:order_id", get(get_order).patch(update_order))
        .route("/orders/:order_id/items", post(add_item).delete(delete_item))
        .route(
            "/orders/:order_id/waiters",
            post(assign_waiter).delete(remove_waiter),
        )
}
