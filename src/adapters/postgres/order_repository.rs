//! PostgreSQL implementation of OrderRepository.
//!
//! Item writes lock the order row (`SELECT ... FOR UPDATE`) and re-check
//! that it is still `open` inside the same transaction, and status/tip
//! updates are a compare-and-set on the status the caller read. Together with
//! the `orders_one_current_per_table` partial unique index this makes the
//! database the serialization point for concurrent writers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, MenuItemId, OrderId, OrderItemId, RestaurantId, TableId, Timestamp,
    UserId, WaiterAssignmentId,
};
use crate::domain::order::{
    CurrentOrder, MenuItemSnapshot, Order, OrderItem, OrderStatus, WaiterAssignment,
};
use crate::ports::{OrderChange, OrderCreation, OrderRepository};

/// PostgreSQL implementation of the OrderRepository port.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Rows
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    table_id: Uuid,
    restaurant_id: Uuid,
    restaurant_name: String,
    status: String,
    currency: String,
    tip_amount_in_cents: i64,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    item_id: Uuid,
    restaurant_id: Uuid,
    item_name: String,
    price_in_cents: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: OrderItemId::from_uuid(row.id),
            menu_item_id: MenuItemId::from_uuid(row.item_id),
            restaurant_id: RestaurantId::from_uuid(row.restaurant_id),
            name: row.item_name,
            price_in_cents: row.price_in_cents,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: Uuid,
    restaurant_id: Uuid,
    name: String,
    price_in_cents: i64,
}

impl From<MenuItemRow> for MenuItemSnapshot {
    fn from(row: MenuItemRow) -> Self {
        MenuItemSnapshot {
            id: MenuItemId::from_uuid(row.id),
            restaurant_id: RestaurantId::from_uuid(row.restaurant_id),
            name: row.name,
            price_in_cents: row.price_in_cents,
        }
    }
}

fn parse_status(s: &str) -> Result<OrderStatus, DomainError> {
    s.parse().map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid order status value: {}", s),
        )
    })
}

fn order_not_found(order_id: &OrderId) -> DomainError {
    DomainError::new(
        ErrorCode::OrderNotFound,
        format!("order with id {} does not exist", order_id),
    )
}

fn order_not_open() -> DomainError {
    DomainError::new(ErrorCode::OrderNotOpen, "order is not open")
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

impl PostgresOrderRepository {
    /// Locks the order row and checks it still accepts item changes.
    async fn lock_open_order(
        tx: &mut Transaction<'_, Postgres>,
        order_id: &OrderId,
    ) -> Result<(), DomainError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id.as_uuid())
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| DomainError::database("Failed to lock order", e))?;

        match status {
            None => Err(order_not_found(order_id)),
            Some(status) if !parse_status(&status)?.accepts_item_changes() => Err(order_not_open()),
            Some(_) => Ok(()),
        }
    }

    async fn touch(
        tx: &mut Transaction<'_, Postgres>,
        order_id: &OrderId,
    ) -> Result<(), DomainError> {
        sqlx::query("UPDATE orders SET updated_at = now() WHERE id = $1")
            .bind(order_id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::database("Failed to touch order", e))?;
        Ok(())
    }

    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1)")
            .bind(order_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to check order", e))
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn get_current_order_for_table(
        &self,
        table_id: &TableId,
    ) -> Result<CurrentOrder, DomainError> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM orders
            WHERE table_id = $1 AND status IN ('open', 'locked')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(table_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch current order", e))?;

        id.map(|id| CurrentOrder {
            id: OrderId::from_uuid(id),
        })
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
        let inserted: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                id, table_id, restaurant_id, status, currency, tip_amount_in_cents,
                created_at, updated_at
            )
            SELECT $1, t.id, t.restaurant_id, 'open', $3, 0, now(), now()
            FROM restaurant_tables t
            WHERE t.id = $2
            ON CONFLICT (table_id) WHERE status IN ('open', 'locked') DO NOTHING
            RETURNING id
            "#,
        )
        .bind(OrderId::new().as_uuid())
        .bind(table_id.as_uuid())
        .bind(currency)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to create order", e))?;

        if let Some(id) = inserted {
            return Ok(OrderCreation {
                id: OrderId::from_uuid(id),
                inserted: true,
            });
        }

        // Either another writer won the race or the table is unknown
        match self.get_current_order_for_table(table_id).await {
            Ok(current) => Ok(OrderCreation {
                id: current.id,
                inserted: false,
            }),
            Err(err) if err.code == ErrorCode::NoCurrentOrder => Err(DomainError::new(
                ErrorCode::TableNotFound,
                format!("table with id {} does not exist", table_id),
            )),
            Err(err) => Err(err),
        }
    }

    async fn get_table_currency(&self, table_id: &TableId) -> Result<String, DomainError> {
        sqlx::query_scalar("SELECT currency FROM restaurant_tables WHERE id = $1")
            .bind(table_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch table currency", e))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TableNotFound,
                    format!("table with id {} does not exist", table_id),
                )
            })
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, DomainError> {
        let row: OrderRow = sqlx::query_as(
            r#"
            SELECT o.id, o.table_id, o.restaurant_id, r.name AS restaurant_name, o.status,
                   o.currency, o.tip_amount_in_cents, o.updated_at
            FROM orders o
            JOIN restaurants r ON r.id = o.restaurant_id
            WHERE o.id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch order", e))?
        .ok_or_else(|| order_not_found(order_id))?;

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, item_id, restaurant_id, item_name, price_in_cents
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch order items", e))?;

        let waiters: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM order_waiters WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch order waiters", e))?;

        Ok(Order {
            id: OrderId::from_uuid(row.id),
            table_id: TableId::from_uuid(row.table_id),
            restaurant_id: RestaurantId::from_uuid(row.restaurant_id),
            restaurant_name: row.restaurant_name,
            status: parse_status(&row.status)?,
            currency: row.currency,
            tip_amount_in_cents: row.tip_amount_in_cents,
            updated_at: Timestamp::from_datetime(row.updated_at),
            waiters: waiters.into_iter().map(UserId::from_uuid).collect(),
            items: items.into_iter().map(OrderItem::from).collect(),
        })
    }

    async fn get_menu_item(&self, item_id: &MenuItemId) -> Result<MenuItemSnapshot, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(
            "SELECT id, restaurant_id, name, price_in_cents FROM menu_items WHERE id = $1",
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch menu item", e))?;

        row.map(MenuItemSnapshot::from).ok_or_else(|| {
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
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        Self::lock_open_order(&mut tx, order_id).await?;

        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, item_id, restaurant_id, item_name, price_in_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(order_id.as_uuid())
        .bind(item.menu_item_id.as_uuid())
        .bind(item.restaurant_id.as_uuid())
        .bind(&item.name)
        .bind(item.price_in_cents)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert order item", e))?;

        Self::touch(&mut tx, order_id).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit order item", e))
    }

    async fn delete_order_item(
        &self,
        order_id: &OrderId,
        order_item_id: &OrderItemId,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        Self::lock_open_order(&mut tx, order_id).await?;

        let result = sqlx::query("DELETE FROM order_items WHERE id = $1 AND order_id = $2")
            .bind(order_item_id.as_uuid())
            .bind(order_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to delete order item", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderItemNotFound,
                format!("order item with id {} does not exist", order_item_id),
            ));
        }

        Self::touch(&mut tx, order_id).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit item removal", e))
    }

    async fn update_order(&self, change: &OrderChange) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = COALESCE($3, status),
                tip_amount_in_cents = COALESCE($4, tip_amount_in_cents),
                updated_at = now()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(change.order_id.as_uuid())
        .bind(change.expected_status.as_str())
        .bind(change.status.map(|s| s.as_str()))
        .bind(change.tip_amount_in_cents)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update order", e))?;

        if result.rows_affected() == 0 {
            if !self.order_exists(&change.order_id).await? {
                return Err(order_not_found(&change.order_id));
            }
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!("order status is no longer {}", change.expected_status),
            ));
        }

        Ok(())
    }

    async fn is_user_restaurant_waiter(
        &self,
        user_id: &UserId,
        restaurant_id: &RestaurantId,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM restaurant_waiters WHERE restaurant_id = $2 AND user_id = $1
            ) OR EXISTS (
                SELECT 1 FROM restaurants WHERE id = $2 AND manager_id = $1
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(restaurant_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to check waiter", e))
    }

    async fn assign_waiter(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> Result<WaiterAssignment, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO order_waiters (id, order_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT order_waiters_order_user_key DO NOTHING
            "#,
        )
        .bind(WaiterAssignmentId::new().as_uuid())
        .bind(order_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                return order_not_found(order_id);
            }
            DomainError::database("Failed to assign waiter", e)
        })?;

        let id: Uuid = sqlx::query_scalar(
            "SELECT id FROM order_waiters WHERE order_id = $1 AND user_id = $2",
        )
        .bind(order_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to read waiter assignment", e))?;

        Ok(WaiterAssignment {
            id: WaiterAssignmentId::from_uuid(id),
            order_id: *order_id,
            user_id: *user_id,
        })
    }

    async fn remove_waiter(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
        assignment_id: &WaiterAssignmentId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "DELETE FROM order_waiters WHERE id = $1 AND order_id = $2 AND user_id = $3",
        )
        .bind(assignment_id.as_uuid())
        .bind(order_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to remove waiter", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AssignmentNotFound,
                format!("waiter assignment with id {} does not exist", assignment_id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_stored_values() {
        for status in OrderStatus::ALL {
            assert_eq!(parse_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn parse_status_rejects_unknown_value() {
        let err = parse_status("paid").unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn item_row_maps_to_frozen_line() {
        let row = OrderItemRow {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            item_name: "Soup".to_string(),
            price_in_cents: 650,
        };
        let item_id = row.item_id;

        let item = OrderItem::from(row);

        assert_eq!(item.menu_item_id.as_uuid(), &item_id);
        assert_eq!(item.name, "Soup");
        assert_eq!(item.price_in_cents, 650);
    }

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresOrderRepository>();
    }
}
