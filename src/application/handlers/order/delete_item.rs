//! DeleteItemHandler - Removes a line item from an open order.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, OrderItemId};
use crate::domain::order::{Order, OrderError};
use crate::ports::OrderRepository;

/// Command to remove a line item.
#[derive(Debug, Clone)]
pub struct DeleteItemCommand {
    pub order_id: OrderId,
    pub order_item_id: OrderItemId,
}

/// Handler for removing items.
pub struct DeleteItemHandler {
    repository: Arc<dyn OrderRepository>,
}

impl DeleteItemHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    /// Returns the order as re-read after the delete.
    pub async fn handle(&self, cmd: DeleteItemCommand) -> Result<Order, OrderError> {
        let order = self.repository.get_order(&cmd.order_id).await?;
        if !order.status.accepts_item_changes() {
            return Err(OrderError::OrderNotOpen);
        }

        self.repository
            .delete_order_item(&cmd.order_id, &cmd.order_item_id)
            .await?;

        Ok(self.repository.get_order(&cmd.order_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderRepository;
    use crate::domain::order::{OrderItem, OrderStatus};

    async fn order_with_items(prices: &[i64]) -> (Arc<InMemoryOrderRepository>, OrderId, Vec<OrderItem>) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let restaurant = repo.add_restaurant("Bistro").await;
        let table = repo.add_table(restaurant, "eur").await;
        let order_id = repo.create_order_for_table(&table, "eur").await.unwrap().id;
        let mut items = Vec::new();
        for (i, price) in prices.iter().enumerate() {
            let menu = repo.add_menu_item(restaurant, format!("Dish {}", i), *price).await;
            let item = OrderItem::from_menu_item(&menu);
            repo.add_item_to_order(&order_id, &item).await.unwrap();
            items.push(item);
        }
        (repo, order_id, items)
    }

    #[tokio::test]
    async fn deletes_item_and_recomputes_total() {
        let (repo, order_id, items) = order_with_items(&[1500, 700]).await;
        let handler = DeleteItemHandler::new(repo);

        let order = handler
            .handle(DeleteItemCommand {
                order_id,
                order_item_id: items[0].id,
            })
            .await
            .unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price_in_cents(), 700);
    }

    #[tokio::test]
    async fn rejects_when_order_finalized() {
        let (repo, order_id, items) = order_with_items(&[1500]).await;
        repo.force_status(&order_id, OrderStatus::Cancelled).await;
        let handler = DeleteItemHandler::new(repo);

        let result = handler
            .handle(DeleteItemCommand {
                order_id,
                order_item_id: items[0].id,
            })
            .await;

        assert_eq!(result.unwrap_err(), OrderError::OrderNotOpen);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (repo, order_id, _) = order_with_items(&[1500]).await;
        let handler = DeleteItemHandler::new(repo);

        let result = handler
            .handle(DeleteItemCommand {
                order_id,
                order_item_id: OrderItemId::new(),
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (repo, _, items) = order_with_items(&[1500]).await;
        let handler = DeleteItemHandler::new(repo);

        let result = handler
            .handle(DeleteItemCommand {
                order_id: OrderId::new(),
                order_item_id: items[0].id,
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }
}
