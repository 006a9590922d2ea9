//! # Shopfront
//!
//! REST API for customers, products, categories and orders.
//!
//! ## Features
//!
//! - **Resource CRUD**: `/customer`, `/product`, `/category` and `/order`,
//!   each with `/all`, `/{id}`, `/insert`, `/{id}/update` and `/{id}/delete`
//! - **Atomic orders**: an order header and its line items are written
//!   together or not at all
//! - **Line item upsert**: adding a product already on an order merges the
//!   quantities (or appends a row in `legacy_append` mode)
//! - **Reports**: units bought per customer and category, and the average
//!   units sold per day, week or month over a date range
//! - **Pluggable storage**: in-memory by default, PostgreSQL behind the
//!   `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shopfront::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_config(ShopConfig::default())
//!         .with_store(InMemoryShopStore::new())
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ErrorResponse, ShopError, ShopResult, ValidationError},
        line_item::LineItemMode,
        model::{
            AddProduct, Category, CategoryInput, CategoryPurchase, Customer, CustomerInput,
            LineItem, LineItemInput, NewOrder, Order, OrderDetail, OrderUpdate, Product,
            ProductInput,
        },
        sales::{AverageQuery, SalesAverage, SalesWindow, TimeUnit},
        service::{
            CategoryService, CustomerService, OrderService, ProductService, ReportService,
            ShopStore,
        },
    };

    // === Storage ===
    pub use crate::storage::{InMemoryShopStore, connect_store};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresShopStore;

    // === Config ===
    pub use crate::config::{OrdersConfig, ServerConfig, ShopConfig, StorageBackend, StorageConfig};

    // === Server ===
    pub use crate::server::{ApiResponse, AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
}
