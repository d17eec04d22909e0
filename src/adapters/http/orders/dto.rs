//! HTTP DTOs for order endpoints.
//!
//! The same request and view types travel over the order WebSocket, so a
//! client sees one JSON shape whichever transport it uses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{MenuItemId, OrderId, OrderItemId, RestaurantId, TableId, UserId};
use crate::domain::order::{Order, OrderError, OrderItem, OrderStatus, OrderUpdate};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// `?tableId=` on the current-order lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentOrderQuery {
    #[serde(rename = "tableId")]
    pub table_id: TableId,
}

/// Body of item add/delete.
///
/// On add `item_id` names a menu item; on delete it names the order line.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ItemRequest {
    pub item_id: Uuid,
}

impl ItemRequest {
    pub fn menu_item_id(&self) -> MenuItemId {
        MenuItemId::from_uuid(self.item_id)
    }

    pub fn order_item_id(&self) -> OrderItemId {
        OrderItemId::from_uuid(self.item_id)
    }
}

/// Status and/or tip change.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub tip_amount_in_cents: Option<i64>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl UpdateOrderRequest {
    pub fn into_update(self) -> Result<OrderUpdate, OrderError> {
        OrderUpdate::new(self.status, self.tip_amount_in_cents)
    }
}

/// Body of waiter removal.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RemoveWaiterRequest {
    pub assign_id: Uuid,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentOrderResponse {
    pub id: OrderId,
}

/// Full order view sent over HTTP and WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderView {
    pub id: OrderId,
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    pub status: OrderStatus,
    pub currency: String,
    pub tip_amount_in_cents: i64,
    pub total_price_in_cents: i64,
    /// RFC 3339.
    pub updated_at: String,
    pub waiters: Vec<UserId>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItemView {
    pub id: OrderItemId,
    /// Menu item the line was copied from.
    pub item_id: MenuItemId,
    pub name: String,
    pub price_in_cents: i64,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id,
            item_id: item.menu_item_id,
            name: item.name.clone(),
            price_in_cents: item.price_in_cents,
        }
    }
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            restaurant_id: order.restaurant_id,
            restaurant_name: order.restaurant_name.clone(),
            status: order.status,
            currency: order.currency.clone(),
            tip_amount_in_cents: order.tip_amount_in_cents,
            total_price_in_cents: order.total_price_in_cents(),
            updated_at: order.updated_at.to_rfc3339(),
            waiters: order.waiters.clone(),
            items: order.items.iter().map(OrderItemView::from).collect(),
        }
    }
}
