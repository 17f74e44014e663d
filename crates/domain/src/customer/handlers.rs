//! Reactions to customer events.

use events::{DomainEvent, EventHandler, HandlerError};

use super::{CustomerAddressChanged, CustomerCreated};

/// Logs every newly created customer.
#[derive(Debug, Default)]
pub struct LogWhenCustomerIsCreated;

impl EventHandler for LogWhenCustomerIsCreated {
    type Event = CustomerCreated;

    fn handle(&self, event: &DomainEvent<CustomerCreated>) -> Result<(), HandlerError> {
        let CustomerCreated { id, name } = event.payload();
        tracing::info!(customer_id = %id, %name, "customer created");
        Ok(())
    }
}

/// Emits a second, announcement-style log line for a created customer.
#[derive(Debug, Default)]
pub struct AnnounceWhenCustomerIsCreated;

impl EventHandler for AnnounceWhenCustomerIsCreated {
    type Event = CustomerCreated;

    fn handle(&self, event: &DomainEvent<CustomerCreated>) -> Result<(), HandlerError> {
        tracing::info!(
            customer_id = %event.payload().id,
            occurred_at = %event.occurred_at(),
            "welcome, {}",
            event.payload().name
        );
        Ok(())
    }
}

/// Logs address changes.
#[derive(Debug, Default)]
pub struct LogWhenCustomerAddressChanged;

impl EventHandler for LogWhenCustomerAddressChanged {
    type Event = CustomerAddressChanged;

    fn handle(&self, event: &DomainEvent<CustomerAddressChanged>) -> Result<(), HandlerError> {
        let CustomerAddressChanged { id, name, address } = event.payload();
        tracing::info!(customer_id = %id, %name, %address, "customer address changed");
        Ok(())
    }
}
