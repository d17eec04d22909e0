//! PostgreSQL adapters for the order and payment ports.
//!
//! - `PostgresOrderRepository` - Orders, line items and waiter assignments
//! - `PostgresPaymentRepository` - Recorded payments, unique per provider id

mod order_repository;
mod payment_repository;

pub use order_repository::PostgresOrderRepository;
pub use payment_repository::PostgresPaymentRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Opens a connection pool sized from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
