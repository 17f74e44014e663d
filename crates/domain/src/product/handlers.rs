//! Reactions to product events.

use events::{DomainEvent, EventHandler, HandlerError};

use super::ProductCreated;

/// Sends the catalog team an email about each new product.
///
/// Delivery is stubbed with a log line.
#[derive(Debug, Default)]
pub struct SendEmailWhenProductIsCreated;

impl EventHandler for SendEmailWhenProductIsCreated {
    type Event = ProductCreated;

    fn handle(&self, event: &DomainEvent<ProductCreated>) -> Result<(), HandlerError> {
        let product = event.payload();
        tracing::info!(
            product_id = %product.id,
            name = %product.name,
            price = %product.price,
            "sending email: product created"
        );
        Ok(())
    }
}
