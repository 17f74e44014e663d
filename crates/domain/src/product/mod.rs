//! Product entity, its events and their handlers.

mod aggregate;
mod events;
mod handlers;
mod service;

pub use aggregate::Product;
pub use self::events::ProductCreated;
pub use handlers::SendEmailWhenProductIsCreated;
pub use service::ProductService;

use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// Product ID is required.
    #[error("Id is required")]
    IdRequired,

    /// Product name is required.
    #[error("Name is required")]
    NameRequired,

    /// Price below zero.
    #[error("Price must be greater than or equal to zero (got {cents} cents)")]
    NegativePrice { cents: i64 },
}
