//! Customer entity, its events and their handlers.

mod aggregate;
mod events;
mod handlers;
mod service;
mod value_objects;

pub use aggregate::Customer;
pub use self::events::{CustomerAddressChanged, CustomerCreated};
pub use handlers::{
    AnnounceWhenCustomerIsCreated, LogWhenCustomerAddressChanged, LogWhenCustomerIsCreated,
};
pub use service::CustomerService;
pub use value_objects::Address;

use thiserror::Error;

/// Errors that can occur during customer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    /// Customer ID is required.
    #[error("Id is required")]
    IdRequired,

    /// Customer name is required.
    #[error("Name is required")]
    NameRequired,

    /// Activation needs an address on file.
    #[error("Address is mandatory to activate a customer")]
    AddressRequired,

    /// An address field is missing.
    #[error("Address {field} is required")]
    InvalidAddress { field: &'static str },

    /// The reward point balance would overflow.
    #[error("Reward points overflow")]
    RewardPointsOverflow,
}
