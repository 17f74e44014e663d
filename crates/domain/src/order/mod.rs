//! Order aggregate and related types.

mod aggregate;
mod value_objects;

pub use aggregate::Order;
pub use value_objects::{Money, OrderItem};

use common::OrderItemId;
use thiserror::Error;

/// Reasons an order is rejected as invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order ID is required.
    #[error("Id is required")]
    IdRequired,

    /// Customer ID is required.
    #[error("CustomerId is required")]
    CustomerIdRequired,

    /// Order has no items.
    #[error("Items are required")]
    ItemsRequired,

    /// An item has an empty id.
    #[error("Item id is required")]
    ItemIdRequired,

    /// An item has a quantity of zero or less.
    #[error("Quantity must be greater than 0 (item {item_id} has {quantity})")]
    InvalidQuantity { item_id: OrderItemId, quantity: i32 },

    /// A line total or the order total does not fit in a `Money`.
    #[error("Order total overflows at item {item_id}")]
    TotalOverflow { item_id: OrderItemId },
}
