//! Customer domain events.

use common::CustomerId;
use events::Event;
use serde::{Deserialize, Serialize};

use super::Address;

/// A customer was registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCreated {
    pub id: CustomerId,
    pub name: String,
}

impl Event for CustomerCreated {
    const EVENT_TYPE: &'static str = "CustomerCreatedEvent";
}

/// A customer moved to a new address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerAddressChanged {
    pub id: CustomerId,
    pub name: String,
    pub address: Address,
}

impl Event for CustomerAddressChanged {
    const EVENT_TYPE: &'static str = "CustomerAddressChangedEvent";
}
