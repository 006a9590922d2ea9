use anyhow::Result;
use shopfront::config::ShopConfig;
use shopfront::server::ServerBuilder;
use shopfront::storage::connect_store;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopfront=info,tower_http=info")),
        )
        .init();

    let config = ShopConfig::load()?;
    let store = connect_store(&config.storage).await?;

    tracing::info!(
        backend = store.backend_name(),
        bind = %config.server.bind,
        "starting shopfront"
    );

    ServerBuilder::new()
        .with_config(config)
        .with_shared_store(store)
        .serve_configured()
        .await
}
