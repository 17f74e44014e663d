//! Product domain events.

use common::ProductId;
use events::Event;
use serde::{Deserialize, Serialize};

use crate::order::Money;

/// A product was added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
}

impl Event for ProductCreated {
    const EVENT_TYPE: &'static str = "ProductCreatedEvent";
}
