//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `OrderRepository` - Orders, line items and waiter assignments
//! - `PaymentRepository` - Recorded payments
//! - `PaymentProvider` - Hosted checkout and webhook verification
//! - `SessionValidator` - Access token validation

mod order_repository;
mod payment_provider;
mod payment_repository;
mod session_validator;

pub use order_repository::{OrderChange, OrderCreation, OrderRepository};
pub use payment_provider::{PaymentError, PaymentProvider};
pub use payment_repository::PaymentRepository;
pub use session_validator::SessionValidator;
