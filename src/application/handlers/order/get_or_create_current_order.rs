//! GetOrCreateCurrentOrderHandler - Returns a table's current order, creating one lazily.

use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, TableId};
use crate::domain::order::{CurrentOrder, OrderError};
use crate::ports::OrderRepository;

/// Command to resolve the current order of a table.
#[derive(Debug, Clone)]
pub struct GetOrCreateCurrentOrderCommand {
    pub table_id: TableId,
}

/// Result carrying the current order id.
#[derive(Debug, Clone)]
pub struct GetOrCreateCurrentOrderResult {
    pub order: CurrentOrder,
    /// True when this call created the order.
    pub created: bool,
}

/// Handler for get-or-create on a table's current order.
pub struct GetOrCreateCurrentOrderHandler {
    repository: Arc<dyn OrderRepository>,
}

impl GetOrCreateCurrentOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: GetOrCreateCurrentOrderCommand,
    ) -> Result<GetOrCreateCurrentOrderResult, OrderError> {
        // 1. Existing open or locked order wins
        match self.repository.get_current_order_for_table(&cmd.table_id).await {
            Ok(order) => {
                return Ok(GetOrCreateCurrentOrderResult {
                    order,
                    created: false,
                })
            }
            Err(err) if err.code == ErrorCode::NoCurrentOrder => {}
            Err(err) => return Err(err.into()),
        }

        // 2. New order in the table's currency
        let currency = self.repository.get_table_currency(&cmd.table_id).await?;
        let creation = self
            .repository
            .create_order_for_table(&cmd.table_id, &currency)
            .await?;

        if creation.inserted {
            tracing::info!(table_id = %cmd.table_id, order_id = %creation.id, %currency, "Created order for table");
        } else {
            tracing::debug!(table_id = %cmd.table_id, order_id = %creation.id, "Lost creation race, using existing order");
        }

        Ok(GetOrCreateCurrentOrderResult {
            order: creation.current(),
            created: creation.inserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderRepository;
    use crate::domain::order::OrderStatus;

    async fn setup() -> (Arc<InMemoryOrderRepository>, TableId) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let restaurant = repo.add_restaurant("Bistro").await;
        let table = repo.add_table(restaurant, "eur").await;
        (repo, table)
    }

    #[tokio::test]
    async fn creates_open_order_in_table_currency() {
        let (repo, table) = setup().await;
        let handler = GetOrCreateCurrentOrderHandler::new(repo.clone());

        let result = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await
            .unwrap();

        assert!(result.created);
        let order = repo.get_order(&result.order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.currency, "eur");
        assert_eq!(order.total_price_in_cents(), 0);
    }

    #[tokio::test]
    async fn second_call_returns_same_order() {
        let (repo, table) = setup().await;
        let handler = GetOrCreateCurrentOrderHandler::new(repo);

        let first = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await
            .unwrap();
        let second = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await
            .unwrap();

        assert_eq!(first.order.id, second.order.id);
        assert!(!second.created);
    }

    #[tokio::test]
    async fn losing_creation_race_is_not_reported_as_created() {
        let (repo, table) = setup().await;
        let winner = repo.create_order_for_table(&table, "eur").await.unwrap();
        repo.stale_current_reads(true);
        let handler = GetOrCreateCurrentOrderHandler::new(repo.clone());

        let result = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await
            .unwrap();

        assert_eq!(result.order.id, winner.id);
        assert!(!result.created);
    }

    #[tokio::test]
    async fn new_order_after_finalization() {
        let (repo, table) = setup().await;
        let handler = GetOrCreateCurrentOrderHandler::new(repo.clone());

        let first = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await
            .unwrap();
        repo.force_status(&first.order.id, OrderStatus::Cancelled).await;
        let second = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await
            .unwrap();

        assert_ne!(first.order.id, second.order.id);
    }

    #[tokio::test]
    async fn unknown_table_is_not_found() {
        let (repo, _) = setup().await;
        let handler = GetOrCreateCurrentOrderHandler::new(repo);

        let result = handler
            .handle(GetOrCreateCurrentOrderCommand {
                table_id: TableId::new(),
            })
            .await;

        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn storage_failure_is_repository_error() {
        let (repo, table) = setup().await;
        repo.fail_writes(true);
        let handler = GetOrCreateCurrentOrderHandler::new(repo);

        let result = handler
            .handle(GetOrCreateCurrentOrderCommand { table_id: table })
            .await;

        assert!(matches!(result, Err(OrderError::Repository(_))));
    }
}
