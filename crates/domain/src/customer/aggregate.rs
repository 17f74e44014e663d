//! Customer entity.

use common::CustomerId;
use serde::Serialize;

use super::{Address, CustomerError};

/// A customer who can place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    id: CustomerId,
    name: String,
    address: Option<Address>,
    active: bool,
    reward_points: u64,
}

impl Customer {
    /// Creates an inactive customer without an address.
    pub fn new(id: impl Into<CustomerId>, name: impl Into<String>) -> Result<Self, CustomerError> {
        let customer = Self {
            id: id.into(),
            name: name.into(),
            address: None,
            active: false,
            reward_points: 0,
        };
        customer.validate()?;
        Ok(customer)
    }

    /// Renames the customer.
    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), CustomerError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CustomerError::NameRequired);
        }
        self.name = name;
        Ok(())
    }

    /// Replaces the customer's address.
    pub fn change_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    /// Activates the customer. An address is required first.
    pub fn activate(&mut self) -> Result<(), CustomerError> {
        if self.address.is_none() {
            return Err(CustomerError::AddressRequired);
        }
        self.active = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Credits reward points. Fails without changing the balance if it
    /// would overflow.
    pub fn add_reward_points(&mut self, points: u64) -> Result<(), CustomerError> {
        self.reward_points = self
            .reward_points
            .checked_add(points)
            .ok_or(CustomerError::RewardPointsOverflow)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CustomerError> {
        if self.id.is_empty() {
            return Err(CustomerError::IdRequired);
        }
        if self.name.is_empty() {
            return Err(CustomerError::NameRequired);
        }
        Ok(())
    }
}

// Query methods
impl Customer {
    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }
}
