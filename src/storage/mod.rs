//! Storage implementations for different backends

pub mod gateway;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryShopStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresShopStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::core::service::ShopStore;
use anyhow::Result;
use std::sync::Arc;

/// Build the backend selected by `storage.backend`.
///
/// The PostgreSQL backend is migrated before it is returned.
pub async fn connect_store(config: &StorageConfig) -> Result<Arc<dyn ShopStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryShopStore::new())),
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            let store = PostgresShopStore::connect(config).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("the postgres backend requires building with the `postgres` feature")
        }
    }
}
