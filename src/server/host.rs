//! Shared state handed to every handler

use crate::config::ShopConfig;
use crate::core::line_item::LineItemMode;
use crate::core::service::ShopStore;
use std::sync::Arc;

/// Application state shared across handlers
///
/// Cloning is cheap: both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShopStore>,
    pub config: Arc<ShopConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ShopStore>, config: ShopConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn line_item_mode(&self) -> LineItemMode {
        self.config.orders.line_item_mode
    }
}
