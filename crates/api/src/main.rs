use std::sync::Arc;

use anyhow::Context;

use wallet_infra::WalletConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WalletConfig::from_env().context("invalid configuration")?;
    wallet_observability::init_with(config.log_format);

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = wallet_api::app::build_services(&config)
        .await
        .context("failed to initialize stores")?;
    let app = wallet_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
