//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PostgresShopStore`], backed by a `sqlx::PgPool`. The schema
//! lives in `migrations/` and is applied with [`PostgresShopStore::migrate`].
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! shopfront = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! Compound writes (order creation, order deletion, line item upsert) run in a
//! single transaction. Adding a product to an order first locks the order row
//! with `SELECT ... FOR UPDATE`, so concurrent adds to one order queue up
//! behind each other instead of losing increments.

use crate::config::StorageConfig;
use crate::core::error::ShopResult;
use crate::core::line_item::{LineItemMode, LineItemWrite, plan_line_item_write};
use crate::core::model::{
    AddProduct, Category, CategoryInput, CategoryPurchase, Customer, CustomerInput, LineItem,
    NewOrder, Order, OrderDetail, OrderLineItem, OrderUpdate, Product, ProductInput,
};
use crate::core::service::{
    CategoryService, CustomerService, OrderService, ProductService, ReportService, ShopStore,
};
use crate::storage::gateway::{affected, exactly_one, zero_or_one};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

const ORDER_COLUMNS: &str = "id, customer_id, status, place_date";

/// Shop store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PostgresShopStore {
    pool: PgPool,
}

impl PostgresShopStore {
    /// Wrap an existing pool. The schema must already be migrated.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from the storage section of the configuration
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .context("storage.database_url is required for the postgres backend")?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        tracing::info!(
            max_connections = config.max_connections,
            "connected to PostgreSQL"
        );
        Ok(Self::new(pool))
    }

    /// Apply pending migrations (idempotent)
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn order_rows<'e, E>(executor: E, order_id: i64) -> ShopResult<Vec<OrderLineItem>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, OrderLineItem>(
            "SELECT id, order_id, product_id, quantity FROM order_details
             WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// NotFound unless `table` holds a row with this id
    async fn require_row(
        &self,
        table: &'static str,
        resource: &'static str,
        id: i64,
    ) -> ShopResult<()> {
        let query = format!("SELECT id FROM {} WHERE id = $1", table);
        let rows: Vec<i64> = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        exactly_one(rows, resource, id).map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[async_trait]
impl CustomerService for PostgresShopStore {
    async fn list_customers(&self) -> ShopResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name FROM customers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_customer(&self, id: i64) -> ShopResult<Customer> {
        let rows = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        exactly_one(rows, "customer", id)
    }

    async fn create_customer(&self, input: CustomerInput) -> ShopResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO customers (first_name, last_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_customer(&self, id: i64, input: CustomerInput) -> ShopResult<()> {
        let result =
            sqlx::query("UPDATE customers SET first_name = $1, last_name = $2 WHERE id = $3")
                .bind(&input.first_name)
                .bind(&input.last_name)
                .bind(id)
                .execute(&self.pool)
                .await?;
        affected(result.rows_affected(), "customer", id)
    }

    async fn delete_customer(&self, id: i64) -> ShopResult<()> {
        // orders.customer_id has no cascade; a customer with orders fails
        // with a foreign key violation.
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        affected(result.rows_affected(), "customer", id)
    }

    async fn customer_orders(&self, id: i64) -> ShopResult<Vec<Order>> {
        self.require_row("customers", "customer", id).await?;
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY id",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[async_trait]
impl ProductService for PostgresShopStore {
    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        let rows =
            sqlx::query_as::<_, Product>("SELECT id, name, quantity FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn get_product(&self, id: i64) -> ShopResult<Product> {
        let rows =
            sqlx::query_as::<_, Product>("SELECT id, name, quantity FROM products WHERE id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        exactly_one(rows, "product", id)
    }

    async fn create_product(&self, input: ProductInput) -> ShopResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products (name, quantity) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(input.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_product(&self, id: i64, input: ProductInput) -> ShopResult<()> {
        let result = sqlx::query("UPDATE products SET name = $1, quantity = $2 WHERE id = $3")
            .bind(&input.name)
            .bind(input.quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;
        affected(result.rows_affected(), "product", id)
    }

    async fn delete_product(&self, id: i64) -> ShopResult<()> {
        // category_products cascades; order_details does not.
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        affected(result.rows_affected(), "product", id)
    }

    async fn product_categories(&self, id: i64) -> ShopResult<Vec<Category>> {
        self.require_row("products", "product", id).await?;
        let rows = sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name FROM categories c
             JOIN category_products cp ON cp.category_id = c.id
             WHERE cp.product_id = $1
             ORDER BY c.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn add_product_category(&self, product_id: i64, category_id: i64) -> ShopResult<()> {
        self.require_row("products", "product", product_id).await?;
        sqlx::query("INSERT INTO category_products (category_id, product_id) VALUES ($1, $2)")
            .bind(category_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_product_category(
        &self,
        product_id: i64,
        category_id: i64,
    ) -> ShopResult<()> {
        let result =
            sqlx::query("DELETE FROM category_products WHERE category_id = $1 AND product_id = $2")
                .bind(category_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
        affected(
            result.rows_affected(),
            "product category",
            format!("{}/{}", product_id, category_id),
        )
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[async_trait]
impl CategoryService for PostgresShopStore {
    async fn list_categories(&self) -> ShopResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_category(&self, id: i64) -> ShopResult<Category> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        exactly_one(rows, "category", id)
    }

    async fn create_category(&self, input: CategoryInput) -> ShopResult<i64> {
        let id =
            sqlx::query_scalar::<_, i64>("INSERT INTO categories (name) VALUES ($1) RETURNING id")
                .bind(&input.name)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }

    async fn update_category(&self, id: i64, input: CategoryInput) -> ShopResult<()> {
        let result = sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(&input.name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        affected(result.rows_affected(), "category", id)
    }

    async fn delete_category(&self, id: i64) -> ShopResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM category_products WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        // Dropping the transaction rolls back the link removal.
        affected(result.rows_affected(), "category", id)?;

        tx.commit().await?;
        Ok(())
    }

    async fn category_products(&self, id: i64) -> ShopResult<Vec<Product>> {
        self.require_row("categories", "category", id).await?;
        let rows = sqlx::query_as::<_, Product>(
            "SELECT p.id, p.name, p.quantity FROM products p
             JOIN category_products cp ON cp.product_id = p.id
             WHERE cp.category_id = $1
             ORDER BY p.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[async_trait]
impl OrderService for PostgresShopStore {
    async fn list_orders(&self) -> ShopResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders ORDER BY id",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_order(&self, id: i64) -> ShopResult<OrderDetail> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        let order = exactly_one(rows, "order", id)?;

        let products = Self::order_rows(&self.pool, id)
            .await?
            .into_iter()
            .map(LineItem::from)
            .collect();
        Ok(OrderDetail { order, products })
    }

    async fn order_line_items(&self, id: i64) -> ShopResult<Vec<LineItem>> {
        self.require_row("orders", "order", id).await?;
        let rows = Self::order_rows(&self.pool, id).await?;
        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    async fn create_order(&self, order: NewOrder) -> ShopResult<i64> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders (customer_id, status, place_date) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(order.customer_id)
        .bind(&order.status)
        .bind(order.place_date)
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.products {
            sqlx::query(
                "INSERT INTO order_details (order_id, product_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn update_order(&self, id: i64, update: OrderUpdate) -> ShopResult<()> {
        let result = sqlx::query("UPDATE orders SET status = $1, place_date = $2 WHERE id = $3")
            .bind(&update.status)
            .bind(update.place_date)
            .bind(id)
            .execute(&self.pool)
            .await?;
        affected(result.rows_affected(), "order", id)
    }

    async fn delete_order(&self, id: i64) -> ShopResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM order_details WHERE order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        affected(result.rows_affected(), "order", id)?;

        tx.commit().await?;
        Ok(())
    }

    async fn add_order_product(
        &self,
        order_id: i64,
        add: AddProduct,
        mode: LineItemMode,
    ) -> ShopResult<i32> {
        let mut tx = self.pool.begin().await?;

        let locked: Vec<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;
        exactly_one(locked, "order", order_id)?;

        let first: Vec<OrderLineItem> = sqlx::query_as(
            "SELECT id, order_id, product_id, quantity FROM order_details
             WHERE order_id = $1 AND product_id = $2 ORDER BY id LIMIT 1",
        )
        .bind(order_id)
        .bind(add.product)
        .fetch_all(&mut *tx)
        .await?;
        let current = zero_or_one(first, "order line item")?;
        let write = plan_line_item_write(current.as_slice(), add.product, add.quantity, mode)?;
        match write {
            LineItemWrite::Insert { quantity } => {
                sqlx::query(
                    "INSERT INTO order_details (order_id, product_id, quantity) VALUES ($1, $2, $3)",
                )
                .bind(order_id)
                .bind(add.product)
                .bind(quantity)
                .execute(&mut *tx)
                .await?;
            }
            LineItemWrite::Update { line_id, quantity } => {
                sqlx::query("UPDATE order_details SET quantity = $1 WHERE id = $2")
                    .bind(quantity)
                    .bind(line_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(write.quantity())
    }

    async fn update_order_product(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> ShopResult<()> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM order_details WHERE order_id = $1 AND product_id = $2 FOR UPDATE",
        )
        .bind(order_id)
        .bind(product_id)
        .fetch_all(&mut *tx)
        .await?;
        let line_id = exactly_one(
            ids,
            "order line item",
            format!("{}/{}", order_id, product_id),
        )?;

        sqlx::query("UPDATE order_details SET quantity = $1 WHERE id = $2")
            .bind(quantity)
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> ShopResult<()> {
        let result =
            sqlx::query("DELETE FROM order_details WHERE order_id = $1 AND product_id = $2")
                .bind(order_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
        affected(
            result.rows_affected(),
            "order line item",
            format!("{}/{}", order_id, product_id),
        )
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[async_trait]
impl ReportService for PostgresShopStore {
    async fn category_purchases(&self) -> ShopResult<Vec<CategoryPurchase>> {
        let rows = sqlx::query_as::<_, CategoryPurchase>(
            "SELECT c.id AS customer_id,
                    c.first_name AS customer_first_name,
                    cat.id AS category_id,
                    cat.name AS category_name,
                    SUM(d.quantity)::BIGINT AS number_purchased
             FROM customers c
             JOIN orders o ON o.customer_id = c.id
             JOIN order_details d ON d.order_id = o.id
             JOIN category_products cp ON cp.product_id = d.product_id
             JOIN categories cat ON cat.id = cp.category_id
             GROUP BY c.id, c.first_name, cat.id, cat.name
             ORDER BY c.id, cat.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn units_sold(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ShopResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(d.quantity), 0)::BIGINT
             FROM order_details d
             JOIN orders o ON o.id = d.order_id
             WHERE o.place_date BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

impl ShopStore for PostgresShopStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
