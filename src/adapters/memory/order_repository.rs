//! In-memory order repository for tests and local development.
//!
//! Mirrors the conditional writes of the PostgreSQL adapter so the engine
//! sees the same race outcomes in both. Everything lives behind one
//! `RwLock`, so each call is atomic.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, MenuItemId, OrderId, OrderItemId, RestaurantId, TableId, Timestamp,
    UserId, WaiterAssignmentId,
};
use crate::domain::order::{
    CurrentOrder, MenuItemSnapshot, Order, OrderItem, OrderStatus, WaiterAssignment,
};
use crate::ports::{OrderChange, OrderCreation, OrderRepository};

#[derive(Debug, Clone)]
struct RestaurantRecord {
    name: String,
    manager_id: Option<UserId>,
    waiters: HashSet<UserId>,
}

#[derive(Debug, Clone)]
struct TableRecord {
    restaurant_id: RestaurantId,
    currency: String,
}

#[derive(Debug, Clone)]
struct OrderRecord {
    table_id: TableId,
    restaurant_id: RestaurantId,
    status: OrderStatus,
    currency: String,
    tip_amount_in_cents: i64,
    created_at: Timestamp,
    updated_at: Timestamp,
    items: Vec<OrderItem>,
    assignments: Vec<WaiterAssignment>,
}

#[derive(Debug, Default)]
struct State {
    restaurants: HashMap<RestaurantId, RestaurantRecord>,
    tables: HashMap<TableId, TableRecord>,
    menu_items: HashMap<MenuItemId, MenuItemSnapshot>,
    orders: HashMap<OrderId, OrderRecord>,
}

impl State {
    fn current_order_for(&self, table_id: &TableId) -> Option<OrderId> {
        self.orders
            .iter()
            .filter(|(_, order)| order.table_id == *table_id && !order.status.is_finalized())
            .max_by_key(|(_, order)| order.created_at)
            .map(|(id, _)| *id)
    }

    fn order_mut(&mut self, order_id: &OrderId) -> Result<&mut OrderRecord, DomainError> {
        self.orders.get_mut(order_id).ok_or_else(|| order_not_found(order_id))
    }
}

fn order_not_found(order_id: &OrderId) -> DomainError {
    DomainError::new(
        ErrorCode::OrderNotFound,
        format!("order with id {} does not exist", order_id),
    )
}

/// In-memory [`OrderRepository`].
///
/// Seed restaurants, tables and menu items with the `add_*` helpers.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    state: RwLock<State>,
    fail_writes: AtomicBool,
    stale_current_reads: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // === Seeding ===

    /// Registers a restaurant.
    pub async fn add_restaurant(&self, name: impl Into<String>) -> RestaurantId {
        let id = RestaurantId::new();
        self.state.write().await.restaurants.insert(
            id,
            RestaurantRecord {
                name: name.into(),
                manager_id: None,
                waiters: HashSet::new(),
            },
        );
        id
    }

    /// Registers a table with its currency.
    pub async fn add_table(&self, restaurant_id: RestaurantId, currency: impl Into<String>) -> TableId {
        let id = TableId::new();
        self.state.write().await.tables.insert(
            id,
            TableRecord {
                restaurant_id,
                currency: currency.into(),
            },
        );
        id
    }

    /// Adds a menu item and returns its snapshot.
    pub async fn add_menu_item(
        &self,
        restaurant_id: RestaurantId,
        name: impl Into<String>,
        price_in_cents: i64,
    ) -> MenuItemSnapshot {
        let item = MenuItemSnapshot {
            id: MenuItemId::new(),
            restaurant_id,
            name: name.into(),
            price_in_cents,
        };
        self.state.write().await.menu_items.insert(item.id, item.clone());
        item
    }

    /// Changes a menu item's current price.
    pub async fn reprice_menu_item(&self, item_id: &MenuItemId, price_in_cents: i64) {
        if let Some(item) = self.state.write().await.menu_items.get_mut(item_id) {
            item.price_in_cents = price_in_cents;
        }
    }

    /// Records a user as waiter of a restaurant.
    pub async fn add_waiter(&self, restaurant_id: &RestaurantId, user_id: UserId) {
        if let Some(restaurant) = self.state.write().await.restaurants.get_mut(restaurant_id) {
            restaurant.waiters.insert(user_id);
        }
    }

    /// Sets the managing user of a restaurant.
    pub async fn set_manager(&self, restaurant_id: &RestaurantId, user_id: UserId) {
        if let Some(restaurant) = self.state.write().await.restaurants.get_mut(restaurant_id) {
            restaurant.manager_id = Some(user_id);
        }
    }

    /// Forces an order into a status, bypassing the engine.
    pub async fn force_status(&self, order_id: &OrderId, status: OrderStatus) {
        if let Some(order) = self.state.write().await.orders.get_mut(order_id) {
            order.status = status;
            order.updated_at = Timestamp::now();
        }
    }

    /// Makes every subsequent write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes current-order lookups miss, as seen by a reader that raced a
    /// concurrent creator.
    pub fn stale_current_reads(&self, stale: bool) {
        self.stale_current_reads.store(stale, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated write failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get_current_order_for_table(
        &self,
        table_id: &TableId,
    ) -> Result<CurrentOrder, DomainError> {
        let state = self.state.read().await;
        let current = if self.stale_current_reads.load(Ordering::SeqCst) {
            None
        } else {
            state.current_order_for(table_id)
        };
        current
            .map(|id| CurrentOrder { id })
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::NoCurrentOrder,
                    "current order for this table doesnt exist",
                )
            })
    }

    async fn create_order_for_table(
        &self,
        table_id: &TableId,
        currency: &str,
    ) -> Result<OrderCreation, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;

        if let Some(id) = state.current_order_for(table_id) {
            return Ok(OrderCreation {
                id,
                inserted: false,
            });
        }

        let restaurant_id = state
            .tables
            .get(table_id)
            .map(|table| table.restaurant_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TableNotFound,
                    format!("table with id {} does not exist", table_id),
                )
            })?;

        let id = OrderId::new();
        let now = Timestamp::now();
        state.orders.insert(
            id,
            OrderRecord {
                table_id: *table_id,
                restaurant_id,
                status: OrderStatus::Open,
                currency: currency.to_string(),
                tip_amount_in_cents: 0,
                created_at: now,
                updated_at: now,
                items: Vec::new(),
                assignments: Vec::new(),
            },
        );
        Ok(OrderCreation { id, inserted: true })
    }

    async fn get_table_currency(&self, table_id: &TableId) -> Result<String, DomainError> {
        self.state
            .read()
            .await
            .tables
            .get(table_id)
            .map(|table| table.currency.clone())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TableNotFound,
                    format!("table with id {} does not exist", table_id),
                )
            })
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, DomainError> {
        let state = self.state.read().await;
        let record = state.orders.get(order_id).ok_or_else(|| order_not_found(order_id))?;
        let restaurant_name = state
            .restaurants
            .get(&record.restaurant_id)
            .map(|r| r.name.clone())
            .unwrap_or_default();

        Ok(Order {
            id: *order_id,
            table_id: record.table_id,
            restaurant_id: record.restaurant_id,
            restaurant_name,
            status: record.status,
            currency: record.currency.clone(),
            tip_amount_in_cents: record.tip_amount_in_cents,
            updated_at: record.updated_at,
            waiters: record.assignments.iter().map(|a| a.user_id).collect(),
            items: record.items.clone(),
        })
    }

    async fn get_menu_item(&self, item_id: &MenuItemId) -> Result<MenuItemSnapshot, DomainError> {
        self.state
            .read()
            .await
            .menu_items
            .get(item_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::MenuItemNotFound,
                    format!("menu item with id {} does not exist", item_id),
                )
            })
    }

    async fn add_item_to_order(
        &self,
        order_id: &OrderId,
        item: &OrderItem,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let order = state.order_mut(order_id)?;
        if !order.status.accepts_item_changes() {
            return Err(DomainError::new(ErrorCode::OrderNotOpen, "order is not open"));
        }
        order.items.push(item.clone());
        order.updated_at = Timestamp::now();
        Ok(())
    }

    async fn delete_order_item(
        &self,
        order_id: &OrderId,
        order_item_id: &OrderItemId,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let order = state.order_mut(order_id)?;
        if !order.status.accepts_item_changes() {
            return Err(DomainError::new(ErrorCode::OrderNotOpen, "order is not open"));
        }
        let position = order
            .items
            .iter()
            .position(|item| item.id == *order_item_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OrderItemNotFound,
                    format!("order item with id {} does not exist", order_item_id),
                )
            })?;
        order.items.remove(position);
        order.updated_at = Timestamp::now();
        Ok(())
    }

    async fn update_order(&self, change: &OrderChange) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let order = state.order_mut(&change.order_id)?;
        if order.status != change.expected_status {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!(
                    "order status is {}, expected {}",
                    order.status, change.expected_status
                ),
            ));
        }
        if let Some(status) = change.status {
            order.status = status;
        }
        if let Some(tip) = change.tip_amount_in_cents {
            order.tip_amount_in_cents = tip;
        }
        order.updated_at = Timestamp::now();
        Ok(())
    }

    async fn is_user_restaurant_waiter(
        &self,
        user_id: &UserId,
        restaurant_id: &RestaurantId,
    ) -> Result<bool, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .restaurants
            .get(restaurant_id)
            .map(|r| r.waiters.contains(user_id) || r.manager_id.as_ref() == Some(user_id))
            .unwrap_or(false))
    }

    async fn assign_waiter(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> Result<WaiterAssignment, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let order = state.order_mut(order_id)?;
        if let Some(existing) = order.assignments.iter().find(|a| a.user_id == *user_id) {
            return Ok(*existing);
        }
        let assignment = WaiterAssignment {
            id: WaiterAssignmentId::new(),
            order_id: *order_id,
            user_id: *user_id,
        };
        order.assignments.push(assignment);
        Ok(assignment)
    }

    async fn remove_waiter(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
        assignment_id: &WaiterAssignmentId,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        let order = state.order_mut(order_id)?;
        let before = order.assignments.len();
        order
            .assignments
            .retain(|a| !(a.id == *assignment_id && a.user_id == *user_id));
        if order.assignments.len() == before {
            return Err(DomainError::new(
                ErrorCode::AssignmentNotFound,
                format!("waiter assignment with id {} does not exist", assignment_id),
            ));
        }
        Ok(())
    }
}
