//! RemoveWaiterHandler - Detaches a waiter assignment from an order.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, UserId, WaiterAssignmentId};
use crate::domain::order::OrderError;
use crate::ports::OrderRepository;

/// Command to remove a waiter assignment.
#[derive(Debug, Clone)]
pub struct RemoveWaiterCommand {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub assignment_id: WaiterAssignmentId,
}

/// Handler for waiter removal.
pub struct RemoveWaiterHandler {
    repository: Arc<dyn OrderRepository>,
}

impl RemoveWaiterHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: RemoveWaiterCommand) -> Result<(), OrderError> {
        let order = self.repository.get_order(&cmd.order_id).await?;

        let is_waiter = self
            .repository
            .is_user_restaurant_waiter(&cmd.user_id, &order.restaurant_id)
            .await?;
        if !is_waiter {
            return Err(OrderError::NotRestaurantWaiter(cmd.user_id));
        }

        self.repository
            .remove_waiter(&cmd.order_id, &cmd.user_id, &cmd.assignment_id)
            .await?;

        tracing::info!(order_id = %cmd.order_id, user_id = %cmd.user_id, "Waiter removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderRepository;

    async fn assigned() -> (Arc<InMemoryOrderRepository>, OrderId, UserId, WaiterAssignmentId) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let restaurant = repo.add_restaurant("Bistro").await;
        let table = repo.add_table(restaurant, "eur").await;
        let order_id = repo.create_order_for_table(&table, "eur").await.unwrap().id;
        let waiter = UserId::new();
        repo.add_waiter(&restaurant, waiter).await;
        let assignment = repo.assign_waiter(&order_id, &waiter).await.unwrap();
        (repo, order_id, waiter, assignment.id)
    }

    #[tokio::test]
    async fn removes_assignment() {
        let (repo, order_id, waiter, assignment_id) = assigned().await;

        RemoveWaiterHandler::new(repo.clone())
            .handle(RemoveWaiterCommand {
                order_id,
                user_id: waiter,
                assignment_id,
            })
            .await
            .unwrap();

        assert!(repo.get_order(&order_id).await.unwrap().waiters.is_empty());
    }

    #[tokio::test]
    async fn unknown_assignment_is_not_found() {
        let (repo, order_id, waiter, _) = assigned().await;

        let result = RemoveWaiterHandler::new(repo)
            .handle(RemoveWaiterCommand {
                order_id,
                user_id: waiter,
                assignment_id: WaiterAssignmentId::new(),
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn non_waiter_is_rejected() {
        let (repo, order_id, _, assignment_id) = assigned().await;
        let stranger = UserId::new();

        let result = RemoveWaiterHandler::new(repo)
            .handle(RemoveWaiterCommand {
                order_id,
                user_id: stranger,
                assignment_id,
            })
            .await;

        assert_eq!(result.unwrap_err(), OrderError::NotRestaurantWaiter(stranger));
    }
}
