//! Domain layer for the ordering system.
//!
//! This crate provides:
//! - The [`Order`] aggregate, which keeps its invariants on every mutation
//! - [`Customer`] and [`Product`] entities
//! - Domain events for customer and product actions, with their handlers
//! - [`CustomerService`] and [`ProductService`], which publish those events
//!   through an injected [`events::EventDispatcher`]

pub mod customer;
pub mod error;
pub mod order;
pub mod product;

pub use customer::{
    Address, AnnounceWhenCustomerIsCreated, Customer, CustomerAddressChanged, CustomerCreated,
    CustomerError, CustomerService, LogWhenCustomerAddressChanged, LogWhenCustomerIsCreated,
};
pub use error::DomainError;
pub use order::{Money, Order, OrderError, OrderItem};
pub use product::{
    Product, ProductCreated, ProductError, ProductService, SendEmailWhenProductIsCreated,
};
