//! Product entity.

use common::ProductId;
use serde::Serialize;

use super::ProductError;
use crate::order::Money;

/// A product that can be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
}

impl Product {
    /// Creates a validated product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
    ) -> Result<Self, ProductError> {
        let id = id.into();
        let name = name.into();

        if id.is_empty() {
            return Err(ProductError::IdRequired);
        }
        if name.is_empty() {
            return Err(ProductError::NameRequired);
        }
        check_price(price)?;

        Ok(Self { id, name, price })
    }

    pub fn change_name(&mut self, name: impl Into<String>) -> Result<(), ProductError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ProductError::NameRequired);
        }
        self.name = name;
        Ok(())
    }

    pub fn change_price(&mut self, price: Money) -> Result<(), ProductError> {
        check_price(price)?;
        self.price = price;
        Ok(())
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }
}

fn check_price(price: Money) -> Result<(), ProductError> {
    if price.is_negative() {
        return Err(ProductError::NegativePrice {
            cents: price.cents(),
        });
    }
    Ok(())
}
