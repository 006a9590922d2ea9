//! Row types and request payloads for the shop resources
//!
//! Row types derive `sqlx::FromRow` when the `postgres` feature is enabled;
//! their field names match the snake_case columns while JSON uses camelCase.
//! Request payloads derive [`validator::Validate`] and are checked by the
//! [`ValidatedJson`](crate::core::extractors::ValidatedJson) extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Units on hand
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Order header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: String,
    /// `None` until the order is placed
    pub place_date: Option<DateTime<Utc>>,
}

/// One product-quantity pair as exposed on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i32,
}

/// A stored `order_details` row.
///
/// `id` only orders the rows of one order; the first row for a product is
/// the one an add-product merge updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

impl From<OrderLineItem> for LineItem {
    fn from(row: OrderLineItem) -> Self {
        LineItem {
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

/// Order header together with its line items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub products: Vec<LineItem>,
}

/// Units a customer bought from one category across all of their orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CategoryPurchase {
    pub customer_id: i64,
    pub customer_first_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub number_purchased: i64,
}

/// Identifier of a freshly inserted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub name: String,
}

/// Body of `POST /product/{id}/category/insert`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryAssignment {
    #[serde(alias = "categoryId")]
    pub category: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(alias = "pID")]
    pub product_id: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}

/// Body of `POST /order/insert`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(alias = "cID")]
    pub customer_id: i64,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub status: String,
    #[serde(default)]
    pub place_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub products: Vec<LineItemInput>,
}

/// Body of `POST /order/{id}/update`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub status: String,
    #[serde(default)]
    pub place_date: Option<DateTime<Utc>>,
}

/// Body of `POST /order/{id}/product/insert`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddProduct {
    #[serde(alias = "productId")]
    pub product: i64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}

/// Body of `POST /order/{id}/product/{productId}/update`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuantityUpdate {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
}
