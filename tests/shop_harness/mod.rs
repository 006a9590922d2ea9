//! Shared test harness for shop store backends
//!
//! Provides seeding helpers plus two macros that every backend's test file
//! invokes with a factory expression:
//!
//! - `shop_store_tests!` exercises the service traits directly
//! - `rest_api_tests!` drives the full HTTP stack through `axum_test`
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod shop_harness;
//!
//! shop_store_tests!(InMemoryShopStore::new());
//! rest_api_tests!(InMemoryShopStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod store_tests;

use chrono::{DateTime, TimeZone, Utc};
use shopfront::prelude::*;

pub async fn seed_customer(store: &dyn ShopStore, first_name: &str) -> i64 {
    store
        .create_customer(CustomerInput {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
        })
        .await
        .expect("customer insert should succeed")
}

pub async fn seed_product(store: &dyn ShopStore, name: &str, quantity: i32) -> i64 {
    store
        .create_product(ProductInput {
            name: name.to_string(),
            quantity,
        })
        .await
        .expect("product insert should succeed")
}

pub async fn seed_category(store: &dyn ShopStore, name: &str) -> i64 {
    store
        .create_category(CategoryInput {
            name: name.to_string(),
        })
        .await
        .expect("category insert should succeed")
}

pub fn new_order(customer_id: i64, lines: &[(i64, i32)]) -> NewOrder {
    NewOrder {
        customer_id,
        status: "new".to_string(),
        place_date: None,
        products: lines
            .iter()
            .map(|&(product_id, quantity)| LineItemInput {
                product_id,
                quantity,
            })
            .collect(),
    }
}

/// Noon UTC on the given day of March 2024
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

/// Window built the way `GET /order/average` builds it from plain dates
pub fn date_window(start: &str, end: &str) -> SalesWindow {
    AverageQuery {
        start: start.to_string(),
        end: end.to_string(),
        unit: None,
    }
    .into_window()
    .unwrap()
}
