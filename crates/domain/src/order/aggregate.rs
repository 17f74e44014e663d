//! Order aggregate implementation.

use common::{CustomerId, OrderId, OrderItemId};
use serde::Serialize;

use super::{Money, OrderError, OrderItem};

/// Order aggregate root.
///
/// An order always satisfies its invariants: it has an id and a customer, at
/// least one item, every item has an id and a positive quantity, and the
/// total fits in a [`Money`]. Mutations build
/// the candidate item list, validate it and only then commit, so a rejected
/// call leaves the order exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    items: Vec<OrderItem>,
    total: Money,
}

impl Order {
    /// Creates a validated order.
    pub fn new(
        id: impl Into<OrderId>,
        customer_id: impl Into<CustomerId>,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        let id = id.into();
        let customer_id = customer_id.into();
        validate(&id, &customer_id, &items)?;
        let total = calculate_total(&items)?;

        Ok(Self {
            total,
            id,
            customer_id,
            items,
        })
    }

    /// Appends an item.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        let mut items = self.items.clone();
        items.push(item);
        self.commit(items)
    }

    /// Removes every item with the given id.
    ///
    /// Removing the last item is rejected, since an order needs at least one.
    pub fn remove_item(&mut self, item_id: &OrderItemId) -> Result<(), OrderError> {
        let items = self
            .items
            .iter()
            .filter(|item| item.id() != item_id)
            .cloned()
            .collect();
        self.commit(items)
    }

    fn commit(&mut self, items: Vec<OrderItem>) -> Result<(), OrderError> {
        validate(&self.id, &self.customer_id, &items)?;
        self.total = calculate_total(&items)?;
        self.items = items;
        Ok(())
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns an item by id.
    pub fn get_item(&self, item_id: &OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Returns the number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity())).sum()
    }

    /// Returns the sum of all line totals.
    pub fn total(&self) -> Money {
        self.total
    }
}

fn validate(
    id: &OrderId,
    customer_id: &CustomerId,
    items: &[OrderItem],
) -> Result<(), OrderError> {
    if id.is_empty() {
        return Err(OrderError::IdRequired);
    }
    if customer_id.is_empty() {
        return Err(OrderError::CustomerIdRequired);
    }
    if items.is_empty() {
        return Err(OrderError::ItemsRequired);
    }
    for item in items {
        if item.id().is_empty() {
            return Err(OrderError::ItemIdRequired);
        }
        if item.quantity() <= 0 {
            return Err(OrderError::InvalidQuantity {
                item_id: item.id().clone(),
                quantity: item.quantity(),
            });
        }
    }
    Ok(())
}

fn calculate_total(items: &[OrderItem]) -> Result<Money, OrderError> {
    items.iter().try_fold(Money::zero(), |total, item| {
        item.line_total()
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| OrderError::TotalOverflow {
                item_id: item.id().clone(),
            })
    })
}
