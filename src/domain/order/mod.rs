//! Order module - the order lifecycle and its edit rules.
//!
//! An order belongs to one table of one restaurant. At most one order per
//! table is current (`open` or `locked`); completed and cancelled orders
//! stay readable forever.

mod aggregate;
mod errors;
mod status;
mod update;

pub use aggregate::{CurrentOrder, MenuItemSnapshot, Order, OrderItem, WaiterAssignment};
pub use errors::OrderError;
pub use status::OrderStatus;
pub use update::{validate_tip, EditPolicy, OrderUpdate, WaiterCheck, MAX_TIP_EXCLUSIVE};

#[cfg(test)]
pub(crate) use aggregate::test_support;
