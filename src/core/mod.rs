//! Domain types, errors and service traits shared by every backend

pub mod error;
pub mod extractors;
pub mod line_item;
pub mod model;
pub mod purchases;
pub mod sales;
pub mod service;

pub use error::{ShopError, ShopResult, ValidationError};
pub use line_item::LineItemMode;
pub use sales::{SalesWindow, TimeUnit};
pub use service::{
    CategoryService, CustomerService, OrderService, ProductService, ReportService, ShopStore,
};
