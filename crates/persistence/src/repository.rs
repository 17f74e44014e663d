//! Repository traits for the persisted entities.

use async_trait::async_trait;
use common::{CustomerId, OrderId, ProductId};
use domain::{Customer, Order, Product};

use crate::Result;

/// Stores orders together with their items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order and all of its items.
    async fn create(&self, order: &Order) -> Result<()>;

    /// Rewrites the order header, then reconciles the stored items with the
    /// order's current items.
    async fn update(&self, order: &Order) -> Result<()>;

    /// Loads an order with its items.
    async fn find(&self, id: &OrderId) -> Result<Order>;

    /// Loads every order. Fails with [`RepositoryError::NoneFound`] when
    /// none is stored.
    ///
    /// [`RepositoryError::NoneFound`]: crate::RepositoryError::NoneFound
    async fn find_all(&self) -> Result<Vec<Order>>;
}

/// Stores customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn create(&self, customer: &Customer) -> Result<()>;

    async fn update(&self, customer: &Customer) -> Result<()>;

    async fn find(&self, id: &CustomerId) -> Result<Customer>;

    /// Loads every customer; empty when none is stored.
    async fn find_all(&self) -> Result<Vec<Customer>>;
}

/// Stores products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<()>;

    async fn update(&self, product: &Product) -> Result<()>;

    async fn find(&self, id: &ProductId) -> Result<Product>;

    /// Loads every product; empty when none is stored.
    async fn find_all(&self) -> Result<Vec<Product>>;
}
