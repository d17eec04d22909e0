//! Order repository port.
//!
//! Defines persistence for orders, their line items and waiter assignments.
//!
//! # Consistency
//!
//! The repository is the serialization point for concurrent writers:
//!
//! - item inserts and deletes only apply while the order is still `open`
//!   and fail with `OrderNotOpen` otherwise;
//! - [`OrderRepository::update_order`] is a compare-and-set on the status the
//!   caller read, failing with `ConcurrentModification` when it moved;
//! - at most one non-finalized order exists per table, and
//!   [`OrderRepository::create_order_for_table`] returns the winner's order
//!   with `inserted == false` when it loses a creation race.

use async_trait::async_trait;

use crate::domain::foundation::{
    DomainError, MenuItemId, OrderId, OrderItemId, RestaurantId, TableId, UserId,
    WaiterAssignmentId,
};
use crate::domain::order::{
    CurrentOrder, MenuItemSnapshot, Order, OrderItem, OrderStatus, WaiterAssignment,
};

/// Write applied by [`OrderRepository::update_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderChange {
    pub order_id: OrderId,
    /// Status the caller read; the write is rejected if it no longer matches.
    pub expected_status: OrderStatus,
    /// New status, if changing.
    pub status: Option<OrderStatus>,
    /// New tip, if changing.
    pub tip_amount_in_cents: Option<i64>,
}

/// Outcome of [`OrderRepository::create_order_for_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCreation {
    pub id: OrderId,
    /// False when another writer's order was returned instead.
    pub inserted: bool,
}

impl OrderCreation {
    pub fn current(&self) -> CurrentOrder {
        CurrentOrder { id: self.id }
    }
}

/// Repository port for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Returns the table's `open` or `locked` order.
    ///
    /// # Errors
    ///
    /// - `NoCurrentOrder` if the table has none
    /// - `DatabaseError` on persistence failure
    async fn get_current_order_for_table(
        &self,
        table_id: &TableId,
    ) -> Result<CurrentOrder, DomainError>;

    /// Creates a new `open` order for the table.
    ///
    /// If another writer created one first, returns that order instead
    /// with `inserted` unset.
    async fn create_order_for_table(
        &self,
        table_id: &TableId,
        currency: &str,
    ) -> Result<OrderCreation, DomainError>;

    /// Returns the currency configured for the table.
    ///
    /// # Errors
    ///
    /// - `TableNotFound` if the table doesn't exist
    async fn get_table_currency(&self, table_id: &TableId) -> Result<String, DomainError>;

    /// Loads the full order with items and assigned waiters.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    async fn get_order(&self, order_id: &OrderId) -> Result<Order, DomainError>;

    /// Loads the current menu data for an item.
    ///
    /// # Errors
    ///
    /// - `MenuItemNotFound` if the item doesn't exist
    async fn get_menu_item(&self, item_id: &MenuItemId) -> Result<MenuItemSnapshot, DomainError>;

    /// Inserts a line item.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `OrderNotOpen` if the order is no longer `open`
    async fn add_item_to_order(
        &self,
        order_id: &OrderId,
        item: &OrderItem,
    ) -> Result<(), DomainError>;

    /// Deletes a line item.
    ///
    /// # Errors
    ///
    /// - `OrderNotOpen` if the order is no longer `open`
    /// - `OrderItemNotFound` if the item is not part of the order
    async fn delete_order_item(
        &self,
        order_id: &OrderId,
        order_item_id: &OrderItemId,
    ) -> Result<(), DomainError>;

    /// Applies a status and/or tip change.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `ConcurrentModification` if the status is no longer `expected_status`
    async fn update_order(&self, change: &OrderChange) -> Result<(), DomainError>;

    /// Returns true if the user may act as staff for the restaurant.
    async fn is_user_restaurant_waiter(
        &self,
        user_id: &UserId,
        restaurant_id: &RestaurantId,
    ) -> Result<bool, DomainError>;

    /// Assigns a waiter to an order. Assigning twice returns the first assignment.
    async fn assign_waiter(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> Result<WaiterAssignment, DomainError>;

    /// Removes a waiter assignment.
    ///
    /// # Errors
    ///
    /// - `AssignmentNotFound` if no such assignment exists for the user and order
    async fn remove_waiter(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
        assignment_id: &WaiterAssignmentId,
    ) -> Result<(), DomainError>;
}
