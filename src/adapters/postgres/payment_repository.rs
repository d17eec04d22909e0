//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, PaymentId, Timestamp};
use crate::domain::payment::Payment;
use crate::ports::PaymentRepository;

const PROVIDER_PAYMENT_KEY: &str = "payments_provider_payment_key";

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount_in_cents: i64,
    currency: String,
    provider: String,
    provider_payment_id: String,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: PaymentId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            amount_in_cents: row.amount_in_cents,
            currency: row.currency,
            provider: row.provider,
            provider_payment_id: row.provider_payment_id,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save_payment(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, amount_in_cents, currency, provider, provider_payment_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.as_uuid())
        .bind(payment.amount_in_cents)
        .bind(&payment.currency)
        .bind(&payment.provider)
        .bind(&payment.provider_payment_id)
        .bind(payment.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(PROVIDER_PAYMENT_KEY) {
                    return DomainError::new(
                        ErrorCode::PaymentAlreadyRecorded,
                        format!("payment {} already recorded", payment.provider_payment_id),
                    );
                }
            }
            DomainError::database("Failed to save payment", e)
        })?;

        Ok(())
    }

    async fn find_by_provider_payment_id(
        &self,
        provider: &str,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, amount_in_cents, currency, provider, provider_payment_id, created_at
            FROM payments
            WHERE provider = $1 AND provider_payment_id = $2
            "#,
        )
        .bind(provider)
        .bind(provider_payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch payment", e))?;

        Ok(row.map(Payment::from))
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, amount_in_cents, currency, provider, provider_payment_id, created_at
            FROM payments
            WHERE order_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch payments", e))?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }
}
