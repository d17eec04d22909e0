//! In-memory adapters.
//!
//! Used by the test suites and for running the service without a database.

mod order_repository;
mod payment_repository;

pub use order_repository::InMemoryOrderRepository;
pub use payment_repository::InMemoryPaymentRepository;
