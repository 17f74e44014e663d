//! Persistence for customers, products and orders.
//!
//! This crate provides:
//! - [`OrderReconciler`], which brings stored order items in line with an
//!   order's current items through an [`OrderItemWriter`]
//! - Repository traits for orders, customers and products
//! - [`InMemoryStore`] for tests and embedding
//! - [`PostgresStore`] backed by a sqlx connection pool
//!
//! # Example
//!
//! ```rust,no_run
//! use domain::{Money, Order, OrderItem};
//! use persistence::{InMemoryStore, OrderRepository};
//!
//! # async fn example() -> persistence::Result<()> {
//! let store = InMemoryStore::new();
//! let mut order = Order::new(
//!     "o1",
//!     "c1",
//!     vec![OrderItem::new("1", "Keyboard", Money::from_units(10), "p1", 2)],
//! )
//! .expect("valid order");
//! store.create(&order).await?;
//!
//! order
//!     .add_item(OrderItem::new("2", "Mouse", Money::from_units(5), "p2", 1))
//!     .expect("valid item");
//! store.update(&order).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod reconciler;
pub mod record;
pub mod repository;

pub use config::DatabaseConfig;
pub use error::{RepositoryError, Result};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use reconciler::{
    ItemChangeSet, OrderItemWriter, OrderReconciler, ReconcilePhase, UpdatePolicy,
};
pub use record::ItemRecord;
pub use repository::{CustomerRepository, OrderRepository, ProductRepository};
