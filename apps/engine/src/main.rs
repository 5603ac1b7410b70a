use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocabot_engine::{Engine, EngineConfig, JsonStore, LogTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(data_dir = %config.data_dir.display(), "starting scheduling engine");

    let store = Arc::new(JsonStore::new(&config.data_dir)?);
    let engine = Engine::new(store, Arc::new(LogTransport), &config);

    let recovered = engine.recover().await?;
    tracing::info!(users = recovered, "engine ready");

    tokio::signal::ctrl_c().await?;
    engine.shutdown();
    tracing::info!("engine stopped");

    Ok(())
}
