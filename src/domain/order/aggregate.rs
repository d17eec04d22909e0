//! Order aggregate view and its line items.
//!
//! The repository is the source of truth; an [`Order`] is always a fresh
//! read. The total is derived from the items on every call and never stored.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    MenuItemId, OrderId, OrderItemId, RestaurantId, TableId, Timestamp, UserId,
    WaiterAssignmentId,
};

use super::OrderStatus;

/// Full read model of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub table_id: TableId,
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
    pub status: OrderStatus,
    /// Lowercase ISO 4217 code, e.g. `eur`.
    pub currency: String,
    pub tip_amount_in_cents: i64,
    pub updated_at: Timestamp,
    /// Assigned waiters in assignment order.
    pub waiters: Vec<UserId>,
    /// Items in insertion order.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of the current items' frozen prices.
    pub fn total_price_in_cents(&self) -> i64 {
        self.items.iter().map(|item| item.price_in_cents).sum()
    }

    /// Amount the customer pays: items plus tip.
    pub fn amount_due_in_cents(&self) -> i64 {
        self.total_price_in_cents() + self.tip_amount_in_cents
    }

    /// Returns true when neither items nor tip carry any value.
    pub fn is_price_zero(&self) -> bool {
        self.total_price_in_cents() == 0 && self.tip_amount_in_cents == 0
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_finalized()
    }
}

/// A line item with its price frozen at the moment it was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub menu_item_id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price_in_cents: i64,
}

impl OrderItem {
    /// Freezes a menu item into a new order line.
    pub fn from_menu_item(menu_item: &MenuItemSnapshot) -> Self {
        Self {
            id: OrderItemId::new(),
            menu_item_id: menu_item.id,
            restaurant_id: menu_item.restaurant_id,
            name: menu_item.name.clone(),
            price_in_cents: menu_item.price_in_cents,
        }
    }
}

/// Current menu data for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemSnapshot {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub name: String,
    pub price_in_cents: i64,
}

/// Summary returned by get-or-create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentOrder {
    pub id: OrderId,
}

/// Staff user attached to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterAssignment {
    pub id: WaiterAssignmentId,
    pub order_id: OrderId,
    pub user_id: UserId,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn menu_item(restaurant_id: RestaurantId, name: &str, price: i64) -> MenuItemSnapshot {
        MenuItemSnapshot {
            id: MenuItemId::new(),
            restaurant_id,
            name: name.to_string(),
            price_in_cents: price,
        }
    }

    pub fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(),
            table_id: TableId::new(),
            restaurant_id: RestaurantId::new(),
            restaurant_name: "Bistro".to_string(),
            status,
            currency: "eur".to_string(),
            tip_amount_in_cents: 0,
            updated_at: Timestamp::now(),
            waiters: vec![],
            items: vec![],
        }
    }
}
