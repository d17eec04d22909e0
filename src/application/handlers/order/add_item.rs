//! AddItemHandler - Adds a frozen-price menu item to an open order.

use std::sync::Arc;

use crate::domain::foundation::{MenuItemId, OrderId};
use crate::domain::order::{Order, OrderError, OrderItem};
use crate::ports::OrderRepository;

/// Command to add a menu item to an order.
#[derive(Debug, Clone)]
pub struct AddItemCommand {
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
}

/// Result of a successful add.
#[derive(Debug, Clone)]
pub struct AddItemResult {
    /// The order as re-read after the insert.
    pub order: Order,
    pub item: OrderItem,
}

/// Handler for adding items.
pub struct AddItemHandler {
    repository: Arc<dyn OrderRepository>,
}

impl AddItemHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: AddItemCommand) -> Result<AddItemResult, OrderError> {
        // 1. Load menu item and order
        let menu_item = self.repository.get_menu_item(&cmd.menu_item_id).await?;
        let order = self.repository.get_order(&cmd.order_id).await?;

        // 2. Item must come from the order's restaurant
        if menu_item.restaurant_id != order.restaurant_id {
            tracing::warn!(
                order_id = %order.id,
                menu_item_id = %menu_item.id,
                "Rejected item from another restaurant"
            );
            return Err(OrderError::ItemRestaurantMismatch);
        }

        // 3. Only open orders take items
        if !order.status.accepts_item_changes() {
            return Err(OrderError::OrderNotOpen);
        }

        // 4. Persist snapshot; the write re-checks the status
        let item = OrderItem::from_menu_item(&menu_item);
        self.repository.add_item_to_order(&order.id, &item).await?;

        // 5. Re-read for the recomputed view
        let order = self.repository.get_order(&cmd.order_id).await?;

        Ok(AddItemResult { order, item })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderRepository;
    use crate::domain::order::{MenuItemSnapshot, OrderStatus};

    struct Fixture {
        repo: Arc<InMemoryOrderRepository>,
        order_id: OrderId,
        burger: MenuItemSnapshot,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let restaurant = repo.add_restaurant("Bistro").await;
        let table = repo.add_table(restaurant, "eur").await;
        let order_id = repo.create_order_for_table(&table, "eur").await.unwrap().id;
        let burger = repo.add_menu_item(restaurant, "Burger", 1500).await;
        Fixture {
            repo,
            order_id,
            burger,
        }
    }

    fn cmd(f: &Fixture, menu_item_id: MenuItemId) -> AddItemCommand {
        AddItemCommand {
            order_id: f.order_id,
            menu_item_id,
        }
    }

    #[tokio::test]
    async fn adds_item_and_recomputes_total() {
        let f = fixture().await;
        let handler = AddItemHandler::new(f.repo.clone());

        let result = handler.handle(cmd(&f, f.burger.id)).await.unwrap();

        assert_eq!(result.order.items.len(), 1);
        assert_eq!(result.order.total_price_in_cents(), 1500);
        assert_eq!(result.item.name, "Burger");
    }

    #[tokio::test]
    async fn price_is_frozen_at_add_time() {
        let f = fixture().await;
        let handler = AddItemHandler::new(f.repo.clone());
        handler.handle(cmd(&f, f.burger.id)).await.unwrap();

        f.repo.reprice_menu_item(&f.burger.id, 9900).await;
        let result = handler.handle(cmd(&f, f.burger.id)).await.unwrap();

        assert_eq!(result.order.total_price_in_cents(), 1500 + 9900);
        assert_eq!(result.order.items[0].price_in_cents, 1500);
    }

    #[tokio::test]
    async fn rejects_item_from_other_restaurant() {
        let f = fixture().await;
        let other = f.repo.add_restaurant("Elsewhere").await;
        let foreign = f.repo.add_menu_item(other, "Pizza", 1200).await;
        let handler = AddItemHandler::new(f.repo.clone());

        let result = handler.handle(cmd(&f, foreign.id)).await;

        assert_eq!(result.unwrap_err(), OrderError::ItemRestaurantMismatch);
    }

    #[tokio::test]
    async fn mismatch_wins_over_status_check() {
        let f = fixture().await;
        f.repo.force_status(&f.order_id, OrderStatus::Completed).await;
        let other = f.repo.add_restaurant("Elsewhere").await;
        let foreign = f.repo.add_menu_item(other, "Pizza", 1200).await;
        let handler = AddItemHandler::new(f.repo.clone());

        let result = handler.handle(cmd(&f, foreign.id)).await;

        assert_eq!(result.unwrap_err(), OrderError::ItemRestaurantMismatch);
    }

    #[tokio::test]
    async fn rejects_when_order_locked() {
        let f = fixture().await;
        f.repo.force_status(&f.order_id, OrderStatus::Locked).await;
        let handler = AddItemHandler::new(f.repo.clone());

        let result = handler.handle(cmd(&f, f.burger.id)).await;

        assert_eq!(result.unwrap_err(), OrderError::OrderNotOpen);
    }

    #[tokio::test]
    async fn unknown_menu_item_is_not_found() {
        let f = fixture().await;
        let handler = AddItemHandler::new(f.repo.clone());

        let result = handler.handle(cmd(&f, MenuItemId::new())).await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let f = fixture().await;
        let handler = AddItemHandler::new(f.repo.clone());

        let result = handler
            .handle(AddItemCommand {
                order_id: OrderId::new(),
                menu_item_id: f.burger.id,
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }
}
