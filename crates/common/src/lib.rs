//! Identifier types shared across the ordering workspace.

mod types;

pub use types::{CustomerId, OrderId, OrderItemId, ProductId};
