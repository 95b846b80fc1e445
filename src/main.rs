use anyhow::{Context, Result};
use settings_sync::{api, config::ServiceConfig, kv};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "settings_sync=info".into()),
        )
        .init();

    info!("settings-sync starting...");

    let config = ServiceConfig::load().context("Invalid configuration")?;
    info!(
        store_uri = %config.store_uri,
        max_settings_bytes = config.max_settings_bytes,
        token_url = %config.provider.token_url,
        user_url = %config.provider.user_url,
        "Configuration loaded"
    );

    let store = kv::open(&config.store_uri).context("Failed to open backing store")?;
    info!("Backing store opened");

    let router = api::create_app(&config, store)?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("settings-sync stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
