//! ServerBuilder for fluent API to build HTTP servers

use super::host::AppState;
use super::router::build_routes;
use crate::config::ShopConfig;
use crate::core::service::ShopStore;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the shop HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ShopConfig::load()?)
///     .with_store(InMemoryShopStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: ShopConfig,
    store: Option<Arc<dyn ShopStore>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: ShopConfig::default(),
            store: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ShopConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the store (required)
    pub fn with_store(mut self, store: impl ShopStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a store that is already shared, e.g. one built by
    /// [`connect_store`](crate::storage::connect_store)
    pub fn with_shared_store(mut self, store: Arc<dyn ShopStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add routes outside the shop resources
    ///
    /// ```ignore
    /// let admin = Router::new().route("/admin/ping", get(|| async { "pong" }));
    ///
    /// ServerBuilder::new()
    ///     .with_store(store)
    ///     .with_custom_routes(admin)
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the router with request tracing applied
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("A store is required. Call .with_store()"))?;

        tracing::info!(
            backend = store.backend_name(),
            line_item_mode = ?self.config.orders.line_item_mode,
            "building router"
        );

        let state = AppState::new(store, self.config);
        let mut app = build_routes(state);
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Stops accepting connections on Ctrl+C or SIGTERM and waits for
    /// in-flight requests.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on `server.bind` from the configuration
    pub async fn serve_configured(self) -> Result<()> {
        let addr = self.config.server.bind.clone();
        self.serve(&addr).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
