//! Bakerboard server binary

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bakerboard::api::{create_router, AppState};
use bakerboard::config::{AppConfig, LogFormat};
use bakerboard::storage::{create_store, seed_bakeries, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    init_tracing(&config)?;

    let store: Arc<dyn RecordStore> = Arc::from(
        create_store(&config.database)
            .await
            .context("failed to open database")?,
    );

    if !config.seed.bakeries.is_empty() {
        let created = seed_bakeries(store.as_ref(), &config.seed.bakeries)
            .await
            .context("failed to seed bakeries")?;
        tracing::info!(created, requested = config.seed.bakeries.len(), "Bakery seeding complete");
    }

    let router = create_router(AppState::new(store));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!(%addr, "Listening for HTTP traffic");

    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("bakerboard=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    Ok(())
}
