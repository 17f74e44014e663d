//! Domain error types.

use events::HandlerError;
use thiserror::Error;

use crate::customer::CustomerError;
use crate::order::OrderError;
use crate::product::ProductError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The order would violate one of its invariants.
    #[error("Invalid order: {0}")]
    Order(#[from] OrderError),

    /// The customer is invalid or cannot perform the action.
    #[error("Customer error: {0}")]
    Customer(#[from] CustomerError),

    /// The product is invalid.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// A domain event handler failed while the action's event was published.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}
