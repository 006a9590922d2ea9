//! Service traits for the shop resources
//!
//! Each backend implements every trait; handlers only see
//! `Arc<dyn ShopStore>`. Path-addressed rows that are absent yield
//! [`ShopError::NotFound`](crate::core::error::ShopError::NotFound); ids
//! referenced from a request body that do not exist yield
//! [`ShopError::ConstraintViolation`](crate::core::error::ShopError::ConstraintViolation).

use crate::core::error::ShopResult;
use crate::core::line_item::LineItemMode;
use crate::core::model::{
    AddProduct, Category, CategoryInput, CategoryPurchase, Customer, CustomerInput, LineItem,
    NewOrder, Order, OrderDetail, OrderUpdate, Product, ProductInput,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn list_customers(&self) -> ShopResult<Vec<Customer>>;

    async fn get_customer(&self, id: i64) -> ShopResult<Customer>;

    /// Returns the generated id
    async fn create_customer(&self, input: CustomerInput) -> ShopResult<i64>;

    async fn update_customer(&self, id: i64, input: CustomerInput) -> ShopResult<()>;

    /// Fails with a constraint violation while the customer still has orders
    async fn delete_customer(&self, id: i64) -> ShopResult<()>;

    /// Order headers placed by a customer
    async fn customer_orders(&self, id: i64) -> ShopResult<Vec<Order>>;
}

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn list_products(&self) -> ShopResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> ShopResult<Product>;

    async fn create_product(&self, input: ProductInput) -> ShopResult<i64>;

    async fn update_product(&self, id: i64, input: ProductInput) -> ShopResult<()>;

    /// Removes the product and its category links in one step. A product
    /// still referenced by an order line is a constraint violation.
    async fn delete_product(&self, id: i64) -> ShopResult<()>;

    async fn product_categories(&self, id: i64) -> ShopResult<Vec<Category>>;

    /// Link a product to a category. An existing link is a constraint violation.
    async fn add_product_category(&self, product_id: i64, category_id: i64) -> ShopResult<()>;

    async fn remove_product_category(&self, product_id: i64, category_id: i64)
    -> ShopResult<()>;
}

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn list_categories(&self) -> ShopResult<Vec<Category>>;

    async fn get_category(&self, id: i64) -> ShopResult<Category>;

    async fn create_category(&self, input: CategoryInput) -> ShopResult<i64>;

    async fn update_category(&self, id: i64, input: CategoryInput) -> ShopResult<()>;

    /// Removes the category and all of its product links atomically
    async fn delete_category(&self, id: i64) -> ShopResult<()>;

    async fn category_products(&self, id: i64) -> ShopResult<Vec<Product>>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn list_orders(&self) -> ShopResult<Vec<Order>>;

    async fn get_order(&self, id: i64) -> ShopResult<OrderDetail>;

    /// Line items of an order in insertion order
    async fn order_line_items(&self, id: i64) -> ShopResult<Vec<LineItem>>;

    /// Write the header and every line item atomically; returns the order id.
    async fn create_order(&self, order: NewOrder) -> ShopResult<i64>;

    async fn update_order(&self, id: i64, update: OrderUpdate) -> ShopResult<()>;

    /// Removes the order and its line items atomically
    async fn delete_order(&self, id: i64) -> ShopResult<()>;

    /// Add units of a product to an order, serialized per order.
    ///
    /// Returns the quantity recorded on the written row.
    async fn add_order_product(
        &self,
        order_id: i64,
        add: AddProduct,
        mode: LineItemMode,
    ) -> ShopResult<i32>;

    /// Set the quantity of the product's single line on the order
    async fn update_order_product(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> ShopResult<()>;

    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> ShopResult<()>;
}

#[async_trait]
pub trait ReportService: Send + Sync {
    async fn category_purchases(&self) -> ShopResult<Vec<CategoryPurchase>>;

    /// Units on orders whose place date lies in `[start, end]`
    async fn units_sold(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ShopResult<i64>;
}

/// Everything a backend must provide to serve the API
pub trait ShopStore:
    CustomerService + ProductService + CategoryService + OrderService + ReportService
{
    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}
