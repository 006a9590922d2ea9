//! HTTP handlers, one module per resource
//!
//! Handlers extract and validate input, call the store, and wrap the result
//! in an [`ApiResponse`](crate::server::envelope::ApiResponse). Errors
//! propagate as [`ShopError`](crate::core::error::ShopError).

pub mod category;
pub mod customer;
pub mod order;
pub mod product;
