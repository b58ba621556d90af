//! catalog-ai - product catalog ingestion and enrichment service
//!
//! Accepts product spreadsheets, stores them as uploads, and fills missing
//! product attributes through an OpenAI-compatible completion service.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_ai::config::{Args, ServiceConfig};
use catalog_ai::services::OpenAiClient;
use catalog_ai::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_ai=info,catalog_common=info,tower_http=info")),
        )
        .with_target(true)
        .init();

    info!(
        "Starting catalog-ai v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ServiceConfig::resolve(&args);

    let db_path = catalog_common::config::ensure_data_dir(&config.data_dir)
        .with_context(|| format!("Failed to create data folder {}", config.data_dir.display()))?;
    info!("Database: {}", db_path.display());

    let db_pool = catalog_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    let completion_configured = config.completion.api_key.is_some();
    let completion = OpenAiClient::new(config.completion.clone())?;
    info!(
        "Completion service: {} (model {}, API key configured: {})",
        config.completion.base_url,
        completion.model(),
        completion_configured
    );

    let state = AppState::new(db_pool, Arc::new(completion), completion_configured);
    let app = catalog_ai::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
