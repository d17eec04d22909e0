//! HTTP handlers for order endpoints.
//!
//! Every mutation re-reads the order and pushes the fresh view to the
//! order's WebSocket subscribers before answering.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{Caller, StaffUser};
use crate::adapters::http::state::AppState;
use crate::adapters::websocket::MessageType;
use crate::application::handlers::order::{
    AddItemCommand, AssignWaiterCommand, DeleteItemCommand, GetOrCreateCurrentOrderCommand,
    GetOrderQuery, RemoveWaiterCommand, UpdateOrderCommand,
};
use crate::domain::foundation::{OrderId, WaiterAssignmentId};
use crate::domain::order::Order;

use super::dto::{
    CurrentOrderQuery, CurrentOrderResponse, ItemRequest, OrderView, RemoveWaiterRequest,
    UpdateOrderRequest,
};

/// Sends the view to subscribers and hands it back for the response.
async fn publish(state: &AppState, message_type: MessageType, order: &Order) -> OrderView {
    let view = OrderView::from(order);
    state.hub.broadcast(&order.id, message_type, &view).await;
    view
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries
// ════════════════════════════════════════════════════════════════════════════════

/// GET /orders/current?tableId= - Current order of a table, opened on demand
pub async fn get_current_order(
    State(state): State<AppState>,
    Query(query): Query<CurrentOrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .current_order_handler()
        .handle(GetOrCreateCurrentOrderCommand {
            table_id: query.table_id,
        })
        .await?;

    Ok(Json(CurrentOrderResponse {
        id: result.order.id,
    }))
}

/// GET /orders/:order_id - Full order view
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .get_order_handler()
        .handle(GetOrderQuery { order_id })
        .await?;

    Ok(Json(OrderView::from(&order)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Items
// ════════════════════════════════════════════════════════════════════════════════

/// POST /orders/:order_id/items - Add a menu item
pub async fn add_item(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Json(request): Json<ItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .add_item_handler()
        .handle(AddItemCommand {
            order_id,
            menu_item_id: request.menu_item_id(),
        })
        .await?;

    let view = publish(&state, MessageType::AddItem, &result.order).await;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /orders/:order_id/items - Remove an order line
pub async fn delete_item(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Json(request): Json<ItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .delete_item_handler()
        .handle(DeleteItemCommand {
            order_id,
            order_item_id: request.order_item_id(),
        })
        .await?;

    Ok(Json(publish(&state, MessageType::DeleteItem, &order).await))
}

// ════════════════════════════════════════════════════════════════════════════════
// Status, tip and waiters
// ════════════════════════════════════════════════════════════════════════════════

/// PATCH /orders/:order_id - Change status and/or tip
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Caller(actor): Caller,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = request.into_update()?;

    let order = state
        .update_order_handler()
        .handle(UpdateOrderCommand {
            order_id,
            update,
            actor,
        })
        .await?;

    Ok(Json(publish(&state, MessageType::UpdateOrder, &order).await))
}

/// POST /orders/:order_id/waiters - Assign the caller to the order
pub async fn assign_waiter(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    StaffUser(user): StaffUser,
) -> Result<impl IntoResponse, ApiError> {
    state
        .assign_waiter_handler()
        .handle(AssignWaiterCommand {
            order_id,
            user_id: user.id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /orders/:order_id/waiters - Drop one of the caller's assignments
pub async fn remove_waiter(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    StaffUser(user): StaffUser,
    Json(request): Json<RemoveWaiterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .remove_waiter_handler()
        .handle(RemoveWaiterCommand {
            order_id,
            user_id: user.id,
            assignment_id: WaiterAssignmentId::from_uuid(request.assign_id),
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
