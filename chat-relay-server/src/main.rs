use std::sync::Arc;

use anyhow::Context;
use chat_relay_server::{app, config::ServerConfig, AppState, OpenAiBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let backend = Arc::new(OpenAiBackend::new(config.model, config.api_base));
    info!("Using OpenAI model: {}", backend.model());
    let state = AppState::new(backend, config.api_key);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("Server listening on {}", config.addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
