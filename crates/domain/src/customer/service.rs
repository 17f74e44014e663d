//! Customer service publishing customer events.

use std::sync::Arc;

use common::CustomerId;
use events::{DomainEvent, EventDispatcher};

use crate::error::DomainError;

use super::{Address, Customer, CustomerAddressChanged, CustomerCreated};

/// Performs customer actions and publishes the matching domain events.
///
/// Events are published after the state change, synchronously. A failing
/// handler is reported as [`DomainError::Handler`]; the state change it
/// reacted to is not undone.
pub struct CustomerService {
    dispatcher: Arc<EventDispatcher>,
}

impl CustomerService {
    /// Creates a service publishing through the given dispatcher.
    pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Returns the dispatcher events are published to.
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Creates a customer and publishes `CustomerCreated`.
    #[tracing::instrument(skip_all)]
    pub fn create(
        &self,
        id: impl Into<CustomerId>,
        name: impl Into<String>,
    ) -> Result<Customer, DomainError> {
        let customer = Customer::new(id, name)?;

        self.dispatcher.notify(&DomainEvent::new(CustomerCreated {
            id: customer.id().clone(),
            name: customer.name().to_string(),
        }))?;

        Ok(customer)
    }

    /// Moves a customer to a new address and publishes `CustomerAddressChanged`.
    #[tracing::instrument(skip_all, fields(customer_id = %customer.id()))]
    pub fn change_address(
        &self,
        customer: &mut Customer,
        address: Address,
    ) -> Result<(), DomainError> {
        customer.change_address(address.clone());

        self.dispatcher
            .notify(&DomainEvent::new(CustomerAddressChanged {
                id: customer.id().clone(),
                name: customer.name().to_string(),
                address,
            }))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{CustomerError, LogWhenCustomerIsCreated};
    use events::{EventHandler, HandlerError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturedAddresses(Mutex<Vec<String>>);

    impl EventHandler for CapturedAddresses {
        type Event = CustomerAddressChanged;

        fn handle(&self, event: &DomainEvent<CustomerAddressChanged>) -> Result<(), HandlerError> {
            self.0
                .lock()
                .unwrap()
                .push(event.payload().address.to_string());
            Ok(())
        }
    }

    struct Rejecting;

    impl EventHandler for Rejecting {
        type Event = CustomerCreated;

        fn handle(&self, _event: &DomainEvent<CustomerCreated>) -> Result<(), HandlerError> {
            Err(HandlerError::new("Rejecting", "crm offline"))
        }
    }

    #[test]
    fn test_create_without_handlers() {
        let service = CustomerService::new(Arc::new(EventDispatcher::new()));
        let customer = service.create("c1", "Customer 1").unwrap();
        assert_eq!(customer.name(), "Customer 1");
    }

    #[test]
    fn test_create_invalid_customer_publishes_nothing() {
        let dispatcher = Arc::new(EventDispatcher::new());
        dispatcher.register(Arc::new(Rejecting));
        let service = CustomerService::new(dispatcher);

        let err = service.create("c1", "").unwrap_err();
        assert!(matches!(
            err,
            DomainError::Customer(CustomerError::NameRequired)
        ));
    }

    #[test]
    fn test_create_surfaces_handler_failure() {
        let dispatcher = Arc::new(EventDispatcher::new());
        dispatcher.register(Arc::new(LogWhenCustomerIsCreated));
        dispatcher.register(Arc::new(Rejecting));
        let service = CustomerService::new(dispatcher);

        let err = service.create("c1", "Customer 1").unwrap_err();
        assert!(matches!(err, DomainError::Handler(ref e) if e.handler() == "Rejecting"));
    }

    #[test]
    fn test_change_address_publishes_new_address() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let captured = Arc::new(CapturedAddresses::default());
        dispatcher.register(Arc::clone(&captured));
        let service = CustomerService::new(dispatcher);

        let mut customer = service.create("c1", "Customer 1").unwrap();
        let address = Address::new("Street 2", 20, "Zip 2", "City 2").unwrap();
        service.change_address(&mut customer, address.clone()).unwrap();

        assert_eq!(customer.address(), Some(&address));
        assert_eq!(
            *captured.0.lock().unwrap(),
            vec!["Street 2, 20, Zip 2 City 2".to_string()]
        );
    }
}
