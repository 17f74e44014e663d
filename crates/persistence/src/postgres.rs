use async_trait::async_trait;
use common::{CustomerId, OrderId, ProductId};
use domain::{Address, Customer, CustomerError, Money, Order, Product};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    ItemRecord, RepositoryError, Result,
    reconciler::{OrderItemWriter, OrderReconciler},
    repository::{CustomerRepository, OrderRepository, ProductRepository},
};

/// PostgreSQL-backed store implementing every repository.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Returns the stored items of an order, in insertion order.
    pub async fn items_of(&self, order_id: &OrderId) -> Result<Vec<ItemRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, name, price_cents, product_id, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(order_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    fn row_to_item(row: &PgRow) -> Result<ItemRecord> {
        Ok(ItemRecord {
            id: row.try_get::<String, _>("id")?.into(),
            order_id: row.try_get::<String, _>("order_id")?.into(),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            product_id: row.try_get::<String, _>("product_id")?.into(),
            quantity: row.try_get("quantity")?,
        })
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer> {
        let mut customer = Customer::new(
            row.try_get::<String, _>("id")?,
            row.try_get::<String, _>("name")?,
        )
        .map_err(RepositoryError::invalid)?;

        let street: Option<String> = row.try_get("street")?;
        let number: Option<i64> = row.try_get("number")?;
        let zipcode: Option<String> = row.try_get("zipcode")?;
        let city: Option<String> = row.try_get("city")?;

        if let (Some(street), Some(number), Some(zipcode), Some(city)) =
            (street, number, zipcode, city)
        {
            let number = u32::try_from(number).map_err(|_| {
                RepositoryError::invalid(CustomerError::InvalidAddress { field: "number" })
            })?;
            let address =
                Address::new(street, number, zipcode, city).map_err(RepositoryError::invalid)?;
            customer.change_address(address);
        }

        if row.try_get::<bool, _>("active")? {
            customer.activate().map_err(RepositoryError::invalid)?;
        }

        let points = points_from_column(row.try_get("reward_points")?)?;
        customer
            .add_reward_points(points)
            .map_err(RepositoryError::invalid)?;

        Ok(customer)
    }

    fn row_to_product(row: &PgRow) -> Result<Product> {
        Product::new(
            row.try_get::<String, _>("id")?,
            row.try_get::<String, _>("name")?,
            Money::from_cents(row.try_get("price_cents")?),
        )
        .map_err(RepositoryError::invalid)
    }

    fn assemble(row: &PgRow, items: &[ItemRecord]) -> Result<Order> {
        let id: String = row.try_get("id")?;
        let customer_id: String = row.try_get("customer_id")?;
        let items = items
            .iter()
            .filter(|record| record.order_id.as_str() == id)
            .map(ItemRecord::to_item)
            .collect();
        Order::new(id, customer_id, items).map_err(RepositoryError::invalid)
    }
}

/// Maps a unique violation on insert to `AlreadyExists`.
fn on_insert(err: sqlx::Error, entity: &'static str, id: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::already_exists(entity, id);
    }
    RepositoryError::Database(err)
}

fn points_to_column(points: u64) -> Result<i64> {
    i64::try_from(points).map_err(|_| RepositoryError::OutOfRange {
        field: "reward_points",
        value: points.to_string(),
    })
}

fn points_from_column(points: i64) -> Result<u64> {
    u64::try_from(points).map_err(|_| RepositoryError::OutOfRange {
        field: "reward_points",
        value: points.to_string(),
    })
}

#[async_trait]
impl OrderRepository for PostgresStore {
    #[tracing::instrument(skip_all, fields(order_id = %order.id()))]
    async fn create(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO orders (id, customer_id, total_cents) VALUES ($1, $2, $3)")
            .bind(order.id().as_str())
            .bind(order.customer_id().as_str())
            .bind(order.total().cents())
            .execute(&mut *tx)
            .await
            .map_err(|e| on_insert(e, "Order", order.id().as_str()))?;

        for item in order.items() {
            let record = ItemRecord::from_item(order.id(), item);
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, name, price_cents, product_id, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(record.id.as_str())
            .bind(record.order_id.as_str())
            .bind(&record.name)
            .bind(record.price.cents())
            .bind(record.product_id.as_str())
            .bind(record.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| on_insert(e, "OrderItem", record.id.as_str()))?;
        }

        tx.commit().await?;
        tracing::debug!(items = order.item_count(), "order created");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(order_id = %order.id()))]
    async fn update(&self, order: &Order) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET customer_id = $2, total_cents = $3 WHERE id = $1")
            .bind(order.id().as_str())
            .bind(order.customer_id().as_str())
            .bind(order.total().cents())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Order", order.id()));
        }

        let previous = self.items_of(order.id()).await?;
        let changes = OrderReconciler::new(self)
            .reconcile(order, &previous)
            .await?;

        tracing::debug!(writes = changes.len(), "order updated");
        Ok(())
    }

    async fn find(&self, id: &OrderId) -> Result<Order> {
        let row = sqlx::query("SELECT id, customer_id FROM orders WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Order", id))?;

        let items = self.items_of(id).await?;
        Self::assemble(&row, &items)
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT id, customer_id FROM orders ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(RepositoryError::NoneFound { entity: "Order" });
        }

        let items = sqlx::query(
            r#"
            SELECT id, order_id, name, price_cents, product_id, quantity
            FROM order_items
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(Self::row_to_item)
        .collect::<Result<Vec<_>>>()?;

        rows.iter().map(|row| Self::assemble(row, &items)).collect()
    }
}

#[async_trait]
impl OrderItemWriter for PostgresStore {
    async fn delete_item(&self, record: &ItemRecord) -> Result<()> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(record.id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("OrderItem", &record.id));
        }
        Ok(())
    }

    async fn insert_item(&self, record: &ItemRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, name, price_cents, product_id, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.order_id.as_str())
        .bind(&record.name)
        .bind(record.price.cents())
        .bind(record.product_id.as_str())
        .bind(record.quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| on_insert(e, "OrderItem", record.id.as_str()))?;
        Ok(())
    }

    async fn update_item(&self, record: &ItemRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE order_items
            SET order_id = $2, name = $3, price_cents = $4, product_id = $5, quantity = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.order_id.as_str())
        .bind(&record.name)
        .bind(record.price.cents())
        .bind(record.product_id.as_str())
        .bind(record.quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("OrderItem", &record.id));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for PostgresStore {
    #[tracing::instrument(skip_all, fields(customer_id = %customer.id()))]
    async fn create(&self, customer: &Customer) -> Result<()> {
        let address = customer.address();
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, street, number, zipcode, city, active, reward_points)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(customer.id().as_str())
        .bind(customer.name())
        .bind(address.map(Address::street))
        .bind(address.map(|a| i64::from(a.number())))
        .bind(address.map(Address::zip))
        .bind(address.map(Address::city))
        .bind(customer.is_active())
        .bind(points_to_column(customer.reward_points())?)
        .execute(&self.pool)
        .await
        .map_err(|e| on_insert(e, "Customer", customer.id().as_str()))?;
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(customer_id = %customer.id()))]
    async fn update(&self, customer: &Customer) -> Result<()> {
        let address = customer.address();
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $2, street = $3, number = $4, zipcode = $5, city = $6,
                active = $7, reward_points = $8
            WHERE id = $1
            "#,
        )
        .bind(customer.id().as_str())
        .bind(customer.name())
        .bind(address.map(Address::street))
        .bind(address.map(|a| i64::from(a.number())))
        .bind(address.map(Address::zip))
        .bind(address.map(Address::city))
        .bind(customer.is_active())
        .bind(points_to_column(customer.reward_points())?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Customer", customer.id()));
        }
        Ok(())
    }

    async fn find(&self, id: &CustomerId) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            SELECT id, name, street, number, zipcode, city, active, reward_points
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Customer", id))?;

        Self::row_to_customer(&row)
    }

    async fn find_all(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, street, number, zipcode, city, active, reward_points
            FROM customers
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_customer).collect()
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    #[tracing::instrument(skip_all, fields(product_id = %product.id()))]
    async fn create(&self, product: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, name, price_cents) VALUES ($1, $2, $3)")
            .bind(product.id().as_str())
            .bind(product.name())
            .bind(product.price().cents())
            .execute(&self.pool)
            .await
            .map_err(|e| on_insert(e, "Product", product.id().as_str()))?;
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(product_id = %product.id()))]
    async fn update(&self, product: &Product) -> Result<()> {
        let result = sqlx::query("UPDATE products SET name = $2, price_cents = $3 WHERE id = $1")
            .bind(product.id().as_str())
            .bind(product.name())
            .bind(product.price().cents())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Product", product.id()));
        }
        Ok(())
    }

    async fn find(&self, id: &ProductId) -> Result<Product> {
        let row = sqlx::query("SELECT id, name, price_cents FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Product", id))?;

        Self::row_to_product(&row)
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, price_cents FROM products ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_product).collect()
    }
}
