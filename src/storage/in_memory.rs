//! In-memory implementation of the shop store for testing and development
//!
//! All tables live behind one `RwLock`. Every operation takes the lock once,
//! validates its references, then mutates, so a compound write either applies
//! completely or not at all.

use crate::core::error::{ShopError, ShopResult};
use crate::core::line_item::{LineItemMode, LineItemWrite, plan_line_item_write};
use crate::core::model::{
    AddProduct, Category, CategoryInput, CategoryPurchase, Customer, CustomerInput, LineItem,
    NewOrder, Order, OrderDetail, OrderLineItem, OrderUpdate, Product, ProductInput,
};
use crate::core::purchases::PurchaseLedger;
use crate::core::service::{
    CategoryService, CustomerService, OrderService, ProductService, ReportService, ShopStore,
};
use crate::storage::gateway::exactly_one;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Sequences {
    customer: i64,
    product: i64,
    category: i64,
    order: i64,
    line: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    products: BTreeMap<i64, Product>,
    categories: BTreeMap<i64, Category>,
    orders: BTreeMap<i64, Order>,
    /// Kept in insertion order
    order_details: Vec<OrderLineItem>,
    /// `(category_id, product_id)`
    category_products: BTreeSet<(i64, i64)>,
    sequences: Sequences,
}

impl Tables {
    fn order_rows(&self, order_id: i64) -> Vec<OrderLineItem> {
        self.order_details
            .iter()
            .filter(|row| row.order_id == order_id)
            .copied()
            .collect()
    }

    fn require_order(&self, id: i64) -> ShopResult<&Order> {
        self.orders
            .get(&id)
            .ok_or_else(|| ShopError::not_found("order", id))
    }
}

/// In-memory shop store
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryShopStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryShopStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ShopResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| ShopError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> ShopResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| ShopError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl CustomerService for InMemoryShopStore {
    async fn list_customers(&self) -> ShopResult<Vec<Customer>> {
        Ok(self.read()?.customers.values().cloned().collect())
    }

    async fn get_customer(&self, id: i64) -> ShopResult<Customer> {
        self.read()?
            .customers
            .get(&id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("customer", id))
    }

    async fn create_customer(&self, input: CustomerInput) -> ShopResult<i64> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.sequences.customer);
        tables.customers.insert(
            id,
            Customer {
                id,
                first_name: input.first_name,
                last_name: input.last_name,
            },
        );
        Ok(id)
    }

    async fn update_customer(&self, id: i64, input: CustomerInput) -> ShopResult<()> {
        let mut tables = self.write()?;
        let customer = tables
            .customers
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found("customer", id))?;
        customer.first_name = input.first_name;
        customer.last_name = input.last_name;
        Ok(())
    }

    async fn delete_customer(&self, id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        if !tables.customers.contains_key(&id) {
            return Err(ShopError::not_found("customer", id));
        }
        if tables.orders.values().any(|order| order.customer_id == id) {
            return Err(ShopError::constraint(format!(
                "customer {} still has orders",
                id
            )));
        }
        tables.customers.remove(&id);
        Ok(())
    }

    async fn customer_orders(&self, id: i64) -> ShopResult<Vec<Order>> {
        let tables = self.read()?;
        if !tables.customers.contains_key(&id) {
            return Err(ShopError::not_found("customer", id));
        }
        Ok(tables
            .orders
            .values()
            .filter(|order| order.customer_id == id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductService for InMemoryShopStore {
    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        Ok(self.read()?.products.values().cloned().collect())
    }

    async fn get_product(&self, id: i64) -> ShopResult<Product> {
        self.read()?
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("product", id))
    }

    async fn create_product(&self, input: ProductInput) -> ShopResult<i64> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.sequences.product);
        tables.products.insert(
            id,
            Product {
                id,
                name: input.name,
                quantity: input.quantity,
            },
        );
        Ok(id)
    }

    async fn update_product(&self, id: i64, input: ProductInput) -> ShopResult<()> {
        let mut tables = self.write()?;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found("product", id))?;
        product.name = input.name;
        product.quantity = input.quantity;
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Err(ShopError::not_found("product", id));
        }
        if tables.order_details.iter().any(|row| row.product_id == id) {
            return Err(ShopError::constraint(format!(
                "product {} is referenced by order line items",
                id
            )));
        }
        tables.category_products.retain(|&(_, product_id)| product_id != id);
        tables.products.remove(&id);
        Ok(())
    }

    async fn product_categories(&self, id: i64) -> ShopResult<Vec<Category>> {
        let tables = self.read()?;
        if !tables.products.contains_key(&id) {
            return Err(ShopError::not_found("product", id));
        }
        Ok(tables
            .category_products
            .iter()
            .filter(|&&(_, product_id)| product_id == id)
            .filter_map(|(category_id, _)| tables.categories.get(category_id).cloned())
            .collect())
    }

    async fn add_product_category(&self, product_id: i64, category_id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&product_id) {
            return Err(ShopError::not_found("product", product_id));
        }
        if !tables.categories.contains_key(&category_id) {
            return Err(ShopError::constraint(format!(
                "category {} does not exist",
                category_id
            )));
        }
        if !tables.category_products.insert((category_id, product_id)) {
            return Err(ShopError::constraint(format!(
                "product {} already belongs to category {}",
                product_id, category_id
            )));
        }
        Ok(())
    }

    async fn remove_product_category(
        &self,
        product_id: i64,
        category_id: i64,
    ) -> ShopResult<()> {
        let mut tables = self.write()?;
        if tables.category_products.remove(&(category_id, product_id)) {
            Ok(())
        } else {
            Err(ShopError::not_found(
                "product category",
                format!("{}/{}", product_id, category_id),
            ))
        }
    }
}

#[async_trait]
impl CategoryService for InMemoryShopStore {
    async fn list_categories(&self) -> ShopResult<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: i64) -> ShopResult<Category> {
        self.read()?
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| ShopError::not_found("category", id))
    }

    async fn create_category(&self, input: CategoryInput) -> ShopResult<i64> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.sequences.category);
        tables.categories.insert(
            id,
            Category {
                id,
                name: input.name,
            },
        );
        Ok(id)
    }

    async fn update_category(&self, id: i64, input: CategoryInput) -> ShopResult<()> {
        let mut tables = self.write()?;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found("category", id))?;
        category.name = input.name;
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        if tables.categories.remove(&id).is_none() {
            return Err(ShopError::not_found("category", id));
        }
        tables.category_products.retain(|&(category_id, _)| category_id != id);
        Ok(())
    }

    async fn category_products(&self, id: i64) -> ShopResult<Vec<Product>> {
        let tables = self.read()?;
        if !tables.categories.contains_key(&id) {
            return Err(ShopError::not_found("category", id));
        }
        Ok(tables
            .category_products
            .range((id, i64::MIN)..=(id, i64::MAX))
            .filter_map(|(_, product_id)| tables.products.get(product_id).cloned())
            .collect())
    }
}

#[async_trait]
impl OrderService for InMemoryShopStore {
    async fn list_orders(&self) -> ShopResult<Vec<Order>> {
        Ok(self.read()?.orders.values().cloned().collect())
    }

    async fn get_order(&self, id: i64) -> ShopResult<OrderDetail> {
        let tables = self.read()?;
        let order = tables.require_order(id)?.clone();
        let products = tables.order_rows(id).into_iter().map(LineItem::from).collect();
        Ok(OrderDetail { order, products })
    }

    async fn order_line_items(&self, id: i64) -> ShopResult<Vec<LineItem>> {
        let tables = self.read()?;
        tables.require_order(id)?;
        Ok(tables.order_rows(id).into_iter().map(LineItem::from).collect())
    }

    async fn create_order(&self, order: NewOrder) -> ShopResult<i64> {
        let mut tables = self.write()?;

        if !tables.customers.contains_key(&order.customer_id) {
            return Err(ShopError::constraint(format!(
                "order references unknown customer {}",
                order.customer_id
            )));
        }
        if let Some(line) = order
            .products
            .iter()
            .find(|line| !tables.products.contains_key(&line.product_id))
        {
            return Err(ShopError::constraint(format!(
                "line item references unknown product {}",
                line.product_id
            )));
        }

        let id = next_id(&mut tables.sequences.order);
        tables.orders.insert(
            id,
            Order {
                id,
                customer_id: order.customer_id,
                status: order.status,
                place_date: order.place_date,
            },
        );
        for line in order.products {
            let line_id = next_id(&mut tables.sequences.line);
            tables.order_details.push(OrderLineItem {
                id: line_id,
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }
        Ok(id)
    }

    async fn update_order(&self, id: i64, update: OrderUpdate) -> ShopResult<()> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found("order", id))?;
        order.status = update.status;
        order.place_date = update.place_date;
        Ok(())
    }

    async fn delete_order(&self, id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        if tables.orders.remove(&id).is_none() {
            return Err(ShopError::not_found("order", id));
        }
        tables.order_details.retain(|row| row.order_id != id);
        Ok(())
    }

    async fn add_order_product(
        &self,
        order_id: i64,
        add: AddProduct,
        mode: LineItemMode,
    ) -> ShopResult<i32> {
        // The write lock is the per-order serialization point.
        let mut tables = self.write()?;
        tables.require_order(order_id)?;
        if !tables.products.contains_key(&add.product) {
            return Err(ShopError::constraint(format!(
                "line item references unknown product {}",
                add.product
            )));
        }

        let existing = tables.order_rows(order_id);
        let write = plan_line_item_write(&existing, add.product, add.quantity, mode)?;
        match write {
            LineItemWrite::Insert { quantity } => {
                let id = next_id(&mut tables.sequences.line);
                tables.order_details.push(OrderLineItem {
                    id,
                    order_id,
                    product_id: add.product,
                    quantity,
                });
            }
            LineItemWrite::Update { line_id, quantity } => {
                if let Some(row) = tables.order_details.iter_mut().find(|row| row.id == line_id) {
                    row.quantity = quantity;
                }
            }
        }
        Ok(write.quantity())
    }

    async fn update_order_product(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> ShopResult<()> {
        let mut tables = self.write()?;
        let matching: Vec<i64> = tables
            .order_details
            .iter()
            .filter(|row| row.order_id == order_id && row.product_id == product_id)
            .map(|row| row.id)
            .collect();
        let line_id = exactly_one(
            matching,
            "order line item",
            format!("{}/{}", order_id, product_id),
        )?;

        if let Some(row) = tables.order_details.iter_mut().find(|row| row.id == line_id) {
            row.quantity = quantity;
        }
        Ok(())
    }

    async fn remove_order_product(&self, order_id: i64, product_id: i64) -> ShopResult<()> {
        let mut tables = self.write()?;
        let before = tables.order_details.len();
        tables
            .order_details
            .retain(|row| !(row.order_id == order_id && row.product_id == product_id));
        if tables.order_details.len() == before {
            return Err(ShopError::not_found(
                "order line item",
                format!("{}/{}", order_id, product_id),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ReportService for InMemoryShopStore {
    async fn category_purchases(&self) -> ShopResult<Vec<CategoryPurchase>> {
        let tables = self.read()?;
        let ledger = PurchaseLedger {
            customers: &tables.customers,
            categories: &tables.categories,
            orders: &tables.orders,
            line_items: &tables.order_details,
            category_products: &tables.category_products,
        };
        Ok(ledger.tally())
    }

    async fn units_sold(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ShopResult<i64> {
        let tables = self.read()?;
        let total = tables
            .order_details
            .iter()
            .filter(|row| {
                tables
                    .orders
                    .get(&row.order_id)
                    .and_then(|order| order.place_date)
                    .is_some_and(|date| date >= start && date <= end)
            })
            .map(|row| i64::from(row.quantity))
            .sum();
        Ok(total)
    }
}

impl ShopStore for InMemoryShopStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
