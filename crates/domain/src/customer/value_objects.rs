//! Value objects for the customer domain.

use serde::{Deserialize, Serialize};

use super::CustomerError;

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    number: u32,
    zip: String,
    city: String,
}

impl Address {
    /// Creates a validated address. Every field is required.
    pub fn new(
        street: impl Into<String>,
        number: u32,
        zip: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, CustomerError> {
        let address = Self {
            street: street.into(),
            number,
            zip: zip.into(),
            city: city.into(),
        };

        if address.street.is_empty() {
            return Err(CustomerError::InvalidAddress { field: "street" });
        }
        if address.number == 0 {
            return Err(CustomerError::InvalidAddress { field: "number" });
        }
        if address.zip.is_empty() {
            return Err(CustomerError::InvalidAddress { field: "zip" });
        }
        if address.city.is_empty() {
            return Err(CustomerError::InvalidAddress { field: "city" });
        }

        Ok(address)
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn zip(&self) -> &str {
        &self.zip
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {} {}", self.street, self.number, self.zip, self.city)
    }
}
