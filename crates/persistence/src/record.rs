use common::{OrderId, OrderItemId, ProductId};
use domain::{Money, OrderItem};

/// An order item as stored: the item's fields plus the order it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub name: String,
    pub price: Money,
    pub product_id: ProductId,
    pub quantity: i32,
}

impl ItemRecord {
    /// Builds the stored form of an item of the given order.
    pub fn from_item(order_id: &OrderId, item: &OrderItem) -> Self {
        Self {
            id: item.id().clone(),
            order_id: order_id.clone(),
            name: item.name().to_string(),
            price: item.unit_price(),
            product_id: item.product_id().clone(),
            quantity: item.quantity(),
        }
    }

    /// Rebuilds the domain item.
    pub fn to_item(&self) -> OrderItem {
        OrderItem::new(
            self.id.clone(),
            self.name.clone(),
            self.price,
            self.product_id.clone(),
            self.quantity,
        )
    }
}
