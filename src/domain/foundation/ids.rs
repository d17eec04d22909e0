//! Strongly-typed identifier value objects.
//!
//! Every entity in the ordering domain is keyed by a UUID. Wrapping each one
//! in its own newtype keeps an `OrderId` from being passed where a
//! `MenuItemId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an order (one table visit).
    OrderId
);

uuid_id!(
    /// Unique identifier for a line item inside an order.
    ///
    /// Distinct from the [`MenuItemId`] the line was copied from.
    OrderItemId
);

uuid_id!(
    /// Unique identifier for a menu item.
    MenuItemId
);

uuid_id!(
    /// Unique identifier for a restaurant.
    RestaurantId
);

uuid_id!(
    /// Unique identifier for a physical table in a restaurant.
    TableId
);

uuid_id!(
    /// Unique identifier for a staff user issued by the auth service.
    UserId
);

uuid_id!(
    /// Unique identifier for a waiter-to-order assignment.
    WaiterAssignmentId
);

uuid_id!(
    /// Unique identifier for a recorded payment.
    PaymentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn id_roundtrips_through_display_and_parse() {
        let id = TableId::new();
        let parsed: TableId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<MenuItemId>().is_err());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = OrderId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        assert_eq!(UserId::from(uuid).as_uuid(), &uuid);
    }
}
