//! Product service publishing product events.

use std::sync::Arc;

use common::ProductId;
use events::{DomainEvent, EventDispatcher};

use crate::error::DomainError;
use crate::order::Money;

use super::{Product, ProductCreated};

/// Performs product actions and publishes the matching domain events.
pub struct ProductService {
    dispatcher: Arc<EventDispatcher>,
}

impl ProductService {
    /// Creates a service publishing through the given dispatcher.
    pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Creates a product and publishes `ProductCreated`.
    ///
    /// The description only travels with the event; it is not part of the
    /// product itself.
    #[tracing::instrument(skip_all)]
    pub fn create(
        &self,
        id: impl Into<ProductId>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
    ) -> Result<Product, DomainError> {
        let product = Product::new(id, name, price)?;

        self.dispatcher.notify(&DomainEvent::new(ProductCreated {
            id: product.id().clone(),
            name: product.name().to_string(),
            description: description.into(),
            price: product.price(),
        }))?;

        Ok(product)
    }
}
