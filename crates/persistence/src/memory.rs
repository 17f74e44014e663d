use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId, ProductId};
use domain::{Customer, Order, Product};
use tokio::sync::RwLock;

use crate::{
    ItemRecord, RepositoryError, Result,
    reconciler::{OrderItemWriter, OrderReconciler},
    repository::{CustomerRepository, OrderRepository, ProductRepository},
};

/// Order header. The total is derived from the items on load.
#[derive(Debug, Clone)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
}

/// In-memory store implementing every repository, for tests and embedding.
///
/// Orders are kept the way a relational schema keeps them: a header table
/// and an item table, so `update` goes through the same item
/// reconciliation as the PostgreSQL store. Item ids are unique across all
/// orders.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    customers: Arc<RwLock<Vec<Customer>>>,
    products: Arc<RwLock<Vec<Product>>>,
    orders: Arc<RwLock<Vec<OrderRow>>>,
    items: Arc<RwLock<Vec<ItemRecord>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored items of an order, in insertion order.
    pub async fn items_of(&self, order_id: &OrderId) -> Vec<ItemRecord> {
        self.items
            .read()
            .await
            .iter()
            .filter(|record| &record.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Removes everything.
    pub async fn clear(&self) {
        self.customers.write().await.clear();
        self.products.write().await.clear();
        self.orders.write().await.clear();
        self.items.write().await.clear();
    }

    fn assemble(row: &OrderRow, items: &[ItemRecord]) -> Result<Order> {
        let items = items
            .iter()
            .filter(|record| record.order_id == row.id)
            .map(ItemRecord::to_item)
            .collect();
        Order::new(row.id.clone(), row.customer_id.clone(), items).map_err(RepositoryError::invalid)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    #[tracing::instrument(skip_all, fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        let mut items = self.items.write().await;

        if orders.iter().any(|row| &row.id == order.id()) {
            return Err(RepositoryError::already_exists("Order", order.id()));
        }
        if let Some(item) = order
            .items()
            .iter()
            .find(|item| items.iter().any(|record| &record.id == item.id()))
        {
            return Err(RepositoryError::already_exists("OrderItem", item.id()));
        }

        orders.push(OrderRow {
            id: order.id().clone(),
            customer_id: order.customer_id().clone(),
        });
        items.extend(
            order
                .items()
                .iter()
                .map(|item| ItemRecord::from_item(order.id(), item)),
        );

        tracing::debug!(items = order.item_count(), "order created");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<()> {
        {
            let mut orders = self.orders.write().await;
            let row = orders
                .iter_mut()
                .find(|row| &row.id == order.id())
                .ok_or_else(|| RepositoryError::not_found("Order", order.id()))?;
            row.customer_id = order.customer_id().clone();
        }

        let previous = self.items_of(order.id()).await;
        let changes = OrderReconciler::new(self)
            .reconcile(order, &previous)
            .await?;

        tracing::debug!(writes = changes.len(), "order updated");
        Ok(())
    }

    async fn find(&self, id: &OrderId) -> Result<Order> {
        let orders = self.orders.read().await;
        let row = orders
            .iter()
            .find(|row| &row.id == id)
            .ok_or_else(|| RepositoryError::not_found("Order", id))?;
        Self::assemble(row, &self.items.read().await)
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        if orders.is_empty() {
            return Err(RepositoryError::NoneFound { entity: "Order" });
        }
        let items = self.items.read().await;
        orders.iter().map(|row| Self::assemble(row, &items)).collect()
    }
}

#[async_trait]
impl OrderItemWriter for InMemoryStore {
    async fn delete_item(&self, record: &ItemRecord) -> Result<()> {
        let mut items = self.items.write().await;
        let position = items
            .iter()
            .position(|stored| stored.id == record.id)
            .ok_or_else(|| RepositoryError::not_found("OrderItem", &record.id))?;
        items.remove(position);
        Ok(())
    }

    async fn insert_item(&self, record: &ItemRecord) -> Result<()> {
        let mut items = self.items.write().await;
        if items.iter().any(|stored| stored.id == record.id) {
            return Err(RepositoryError::already_exists("OrderItem", &record.id));
        }
        items.push(record.clone());
        Ok(())
    }

    async fn update_item(&self, record: &ItemRecord) -> Result<()> {
        let mut items = self.items.write().await;
        let stored = items
            .iter_mut()
            .find(|stored| stored.id == record.id)
            .ok_or_else(|| RepositoryError::not_found("OrderItem", &record.id))?;
        *stored = record.clone();
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    #[tracing::instrument(skip_all, fields(customer_id = %customer.id()))]
    async fn create(&self, customer: &Customer) -> Result<()> {
        let mut customers = self.customers.write().await;
        if customers.iter().any(|stored| stored.id() == customer.id()) {
            return Err(RepositoryError::already_exists("Customer", customer.id()));
        }
        customers.push(customer.clone());
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(customer_id = %customer.id()))]
    async fn update(&self, customer: &Customer) -> Result<()> {
        let mut customers = self.customers.write().await;
        let stored = customers
            .iter_mut()
            .find(|stored| stored.id() == customer.id())
            .ok_or_else(|| RepositoryError::not_found("Customer", customer.id()))?;
        *stored = customer.clone();
        Ok(())
    }

    async fn find(&self, id: &CustomerId) -> Result<Customer> {
        self.customers
            .read()
            .await
            .iter()
            .find(|stored| stored.id() == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Customer", id))
    }

    async fn find_all(&self) -> Result<Vec<Customer>> {
        Ok(self.customers.read().await.clone())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    #[tracing::instrument(skip_all, fields(product_id = %product.id()))]
    async fn create(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.iter().any(|stored| stored.id() == product.id()) {
            return Err(RepositoryError::already_exists("Product", product.id()));
        }
        products.push(product.clone());
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(product_id = %product.id()))]
    async fn update(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        let stored = products
            .iter_mut()
            .find(|stored| stored.id() == product.id())
            .ok_or_else(|| RepositoryError::not_found("Product", product.id()))?;
        *stored = product.clone();
        Ok(())
    }

    async fn find(&self, id: &ProductId) -> Result<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|stored| stored.id() == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Product", id))
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderItemId;
    use domain::{Money, OrderItem};

    fn item(id: &str, units: i64, quantity: i32) -> OrderItem {
        OrderItem::new(id, format!("Product {id}"), Money::from_units(units), "p1", quantity)
    }

    fn item_ids(records: &[ItemRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn create_and_find_order() {
        let store = InMemoryStore::new();
        let order = Order::new("o1", "c1", vec![item("1", 10, 2)]).unwrap();

        OrderRepository::create(&store, &order).await.unwrap();

        let found = OrderRepository::find(&store, &OrderId::new("o1"))
            .await
            .unwrap();
        assert_eq!(found, order);
        assert_eq!(found.total(), Money::from_units(20));
    }

    #[tokio::test]
    async fn create_duplicate_order_fails() {
        let store = InMemoryStore::new();
        let order = Order::new("o1", "c1", vec![item("1", 10, 2)]).unwrap();
        OrderRepository::create(&store, &order).await.unwrap();

        let other = Order::new("o1", "c2", vec![item("9", 1, 1)]).unwrap();
        let err = OrderRepository::create(&store, &other).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { entity: "Order", .. }));
    }

    #[tokio::test]
    async fn create_with_taken_item_id_writes_nothing() {
        let store = InMemoryStore::new();
        let first = Order::new("o1", "c1", vec![item("1", 10, 2)]).unwrap();
        OrderRepository::create(&store, &first).await.unwrap();

        let second = Order::new("o2", "c1", vec![item("1", 10, 1)]).unwrap();
        let err = OrderRepository::create(&store, &second).await.unwrap_err();

        assert!(matches!(err, RepositoryError::AlreadyExists { entity: "OrderItem", .. }));
        assert!(OrderRepository::find(&store, &OrderId::new("o2")).await.is_err());
        assert!(store.items_of(&OrderId::new("o2")).await.is_empty());
    }

    #[tokio::test]
    async fn update_reconciles_items() {
        let store = InMemoryStore::new();
        let mut order = Order::new("o1", "c1", vec![item("1", 10, 2), item("2", 30, 2)]).unwrap();
        OrderRepository::create(&store, &order).await.unwrap();

        order.remove_item(&OrderItemId::new("1")).unwrap();
        order.add_item(item("3", 45, 3)).unwrap();
        OrderRepository::update(&store, &order).await.unwrap();

        let stored = store.items_of(&OrderId::new("o1")).await;
        assert_eq!(item_ids(&stored), vec!["2", "3"]);

        let found = OrderRepository::find(&store, &OrderId::new("o1"))
            .await
            .unwrap();
        assert_eq!(found.total(), Money::from_units(60 + 135));
    }

    #[tokio::test]
    async fn update_is_stable_when_nothing_changed() {
        let store = InMemoryStore::new();
        let order = Order::new("o1", "c1", vec![item("1", 10, 2), item("2", 30, 2)]).unwrap();
        OrderRepository::create(&store, &order).await.unwrap();

        OrderRepository::update(&store, &order).await.unwrap();
        OrderRepository::update(&store, &order).await.unwrap();

        let found = OrderRepository::find(&store, &OrderId::new("o1"))
            .await
            .unwrap();
        assert_eq!(found, order);
    }

    #[tokio::test]
    async fn update_missing_order_fails() {
        let store = InMemoryStore::new();
        let order = Order::new("o1", "c1", vec![item("1", 10, 2)]).unwrap();

        let err = OrderRepository::update(&store, &order).await.unwrap_err();
        assert_eq!(err.to_string(), "Order not found: o1");
        assert!(store.items_of(&OrderId::new("o1")).await.is_empty());
    }

    #[tokio::test]
    async fn find_all_orders_on_empty_store_fails() {
        let store = InMemoryStore::new();
        let err = OrderRepository::find_all(&store).await.unwrap_err();
        assert_eq!(err.to_string(), "Orders not found");
    }

    #[tokio::test]
    async fn customers_round_trip_with_state() {
        let store = InMemoryStore::new();
        let mut customer = Customer::new("c1", "Customer 1").unwrap();
        CustomerRepository::create(&store, &customer).await.unwrap();

        customer.change_address(domain::Address::new("Street 1", 1, "Zip 1", "City 1").unwrap());
        customer.activate().unwrap();
        customer.add_reward_points(10).unwrap();
        CustomerRepository::update(&store, &customer).await.unwrap();

        let found = CustomerRepository::find(&store, &CustomerId::new("c1"))
            .await
            .unwrap();
        assert_eq!(found, customer);
        assert_eq!(CustomerRepository::find_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_customer_and_product() {
        let store = InMemoryStore::new();

        let err = CustomerRepository::find(&store, &CustomerId::new("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Customer not found: nope");

        let err = ProductRepository::find(&store, &ProductId::new("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product not found: nope");

        assert!(CustomerRepository::find_all(&store).await.unwrap().is_empty());
        assert!(ProductRepository::find_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn products_update_in_place() {
        let store = InMemoryStore::new();
        let mut product = Product::new("p1", "Product 1", Money::from_units(10)).unwrap();
        ProductRepository::create(&store, &product).await.unwrap();

        product.change_price(Money::from_units(12)).unwrap();
        ProductRepository::update(&store, &product).await.unwrap();

        let found = ProductRepository::find(&store, &ProductId::new("p1"))
            .await
            .unwrap();
        assert_eq!(found.price(), Money::from_units(12));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryStore::new();
        let order = Order::new("o1", "c1", vec![item("1", 10, 2)]).unwrap();
        OrderRepository::create(&store, &order).await.unwrap();

        store.clear().await;

        assert!(OrderRepository::find_all(&store).await.is_err());
        assert!(store.items_of(&OrderId::new("o1")).await.is_empty());
    }
}
