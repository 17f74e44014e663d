//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p persistence --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{CustomerId, OrderId, OrderItemId, ProductId};
use domain::{Address, Customer, Money, Order, OrderItem, Product};
use persistence::{
    CustomerRepository, DatabaseConfig, OrderRepository, PostgresStore, ProductRepository,
    RepositoryError,
};
use serial_test::serial;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let config = DatabaseConfig {
                url: connection_string.clone(),
                max_connections: 1,
            };
            let temp_pool = config.connect().await.unwrap();
            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = DatabaseConfig {
        url: info.connection_string.clone(),
        max_connections: 5,
    }
    .connect()
    .await
    .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, products, customers")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn seed(store: &PostgresStore) -> (Product, Product, Product) {
    let mut customer = Customer::new("123", "Customer 1").unwrap();
    customer.change_address(Address::new("Street 1", 1, "Zipcode 1", "City 1").unwrap());
    CustomerRepository::create(store, &customer).await.unwrap();

    let products = (
        Product::new("123", "Product 1", Money::from_units(10)).unwrap(),
        Product::new("133", "Product 2", Money::from_units(30)).unwrap(),
        Product::new("143", "Product 3", Money::from_units(45)).unwrap(),
    );
    ProductRepository::create(store, &products.0).await.unwrap();
    ProductRepository::create(store, &products.1).await.unwrap();
    ProductRepository::create(store, &products.2).await.unwrap();
    products
}

fn item_for(id: &str, product: &Product, quantity: i32) -> OrderItem {
    OrderItem::new(id, product.name(), product.price(), product.id().clone(), quantity)
}

#[tokio::test]
#[serial]
async fn create_and_find_order() {
    let store = get_test_store().await;
    let (product, _, _) = seed(&store).await;

    let order = Order::new("123", "123", vec![item_for("1", &product, 2)]).unwrap();
    OrderRepository::create(&store, &order).await.unwrap();

    let found = OrderRepository::find(&store, &OrderId::new("123"))
        .await
        .unwrap();
    assert_eq!(found, order);

    let total: i64 = sqlx::query_scalar("SELECT total_cents FROM orders WHERE id = '123'")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(total, Money::from_units(20).cents());
}

#[tokio::test]
#[serial]
async fn create_duplicate_order_is_rejected_atomically() {
    let store = get_test_store().await;
    let (product, product2, _) = seed(&store).await;

    let order = Order::new("123", "123", vec![item_for("1", &product, 2)]).unwrap();
    OrderRepository::create(&store, &order).await.unwrap();

    let clash = Order::new("124", "123", vec![item_for("2", &product2, 1), item_for("1", &product, 1)])
        .unwrap();
    let err = OrderRepository::create(&store, &clash).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists { entity: "OrderItem", .. }));

    assert!(matches!(
        OrderRepository::find(&store, &OrderId::new("124")).await,
        Err(RepositoryError::NotFound { .. })
    ));
    assert!(store.items_of(&OrderId::new("124")).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn update_order_reconciles_items() {
    let store = get_test_store().await;
    let (product, product2, product3) = seed(&store).await;

    let mut order = Order::new(
        "123",
        "123",
        vec![item_for("1", &product, 2), item_for("2", &product2, 2)],
    )
    .unwrap();
    OrderRepository::create(&store, &order).await.unwrap();

    order.remove_item(&OrderItemId::new("1")).unwrap();
    order.add_item(item_for("3", &product3, 3)).unwrap();
    OrderRepository::update(&store, &order).await.unwrap();

    let items = store.items_of(&OrderId::new("123")).await.unwrap();
    let ids: Vec<_> = items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"]);

    let found = OrderRepository::find(&store, &OrderId::new("123"))
        .await
        .unwrap();
    assert_eq!(found, order);
    assert_eq!(found.total(), Money::from_units(195));
}

#[tokio::test]
#[serial]
async fn update_missing_order_fails() {
    let store = get_test_store().await;
    let (product, _, _) = seed(&store).await;

    let order = Order::new("999", "123", vec![item_for("1", &product, 1)]).unwrap();
    let err = OrderRepository::update(&store, &order).await.unwrap_err();
    assert_eq!(err.to_string(), "Order not found: 999");
}

#[tokio::test]
#[serial]
async fn find_all_orders() {
    let store = get_test_store().await;
    let (product, product2, _) = seed(&store).await;

    let err = OrderRepository::find_all(&store).await.unwrap_err();
    assert_eq!(err.to_string(), "Orders not found");

    let first = Order::new("123", "123", vec![item_for("1", &product, 2)]).unwrap();
    let second = Order::new("124", "123", vec![item_for("2", &product2, 1)]).unwrap();
    OrderRepository::create(&store, &first).await.unwrap();
    OrderRepository::create(&store, &second).await.unwrap();

    assert_eq!(
        OrderRepository::find_all(&store).await.unwrap(),
        vec![first, second]
    );
}

#[tokio::test]
#[serial]
async fn customer_state_round_trips() {
    let store = get_test_store().await;

    let mut customer = Customer::new("c1", "Customer 1").unwrap();
    CustomerRepository::create(&store, &customer).await.unwrap();

    let found = CustomerRepository::find(&store, &CustomerId::new("c1"))
        .await
        .unwrap();
    assert_eq!(found, customer);

    customer.change_name("Customer One").unwrap();
    customer.change_address(Address::new("Street 2", 22, "Zip 2", "City 2").unwrap());
    customer.activate().unwrap();
    customer.add_reward_points(15).unwrap();
    CustomerRepository::update(&store, &customer).await.unwrap();

    let found = CustomerRepository::find(&store, &CustomerId::new("c1"))
        .await
        .unwrap();
    assert_eq!(found, customer);
    assert_eq!(CustomerRepository::find_all(&store).await.unwrap(), vec![customer]);
}

#[tokio::test]
#[serial]
async fn products_create_update_find() {
    let store = get_test_store().await;

    assert!(ProductRepository::find_all(&store).await.unwrap().is_empty());

    let mut product = Product::new("p1", "Product 1", Money::from_units(10)).unwrap();
    ProductRepository::create(&store, &product).await.unwrap();

    let err = ProductRepository::create(&store, &product).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists { entity: "Product", .. }));

    product.change_price(Money::from_cents(1999)).unwrap();
    ProductRepository::update(&store, &product).await.unwrap();

    let found = ProductRepository::find(&store, &ProductId::new("p1"))
        .await
        .unwrap();
    assert_eq!(found, product);

    let err = ProductRepository::find(&store, &ProductId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { entity: "Product", .. }));
}
