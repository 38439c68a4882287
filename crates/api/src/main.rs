use std::sync::Arc;

use anyhow::Context;

use storefront_api::app::{build_app, services::AppServices};
use storefront_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    storefront_observability::init(config.log_format);
    config.log_defaults();

    let services = AppServices::from_config(&config)
        .await
        .context("failed to open the catalog store")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
