mod config;
mod db;
mod errors;
mod letters;
mod llm_client;
mod models;
mod persistence;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::persistence::store::PgLetterStore;
use crate::persistence::Persistence;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LOR API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = LlmClient::new(
        config.llm_api_key.clone(),
        &config.llm_base_url,
        config.llm_provider.clone(),
    )
    .context("Failed to build HTTP client for the completion provider")?;
    info!(
        "LLM client initialized (provider: {}, model: {})",
        config.llm_provider,
        llm_client::MODEL
    );

    // Initialize persistence (optional)
    let persistence = build_persistence(&config)?;

    let state = AppState {
        llm: Arc::new(llm),
        persistence,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the persistence handle and starts a background reachability probe.
/// Missing or placeholder datastore credentials disable persistence without
/// failing startup.
fn build_persistence(config: &Config) -> Result<Persistence> {
    let Some(db_config) = &config.database else {
        warn!("Datastore URL or service key not set, persistence disabled");
        return Ok(Persistence::disabled());
    };

    let pool = create_pool(db_config)?;
    let persistence = Persistence::new(
        Arc::new(PgLetterStore::new(pool)),
        config.reprobe_policy,
    );

    let probe = persistence.clone();
    tokio::spawn(async move {
        info!("Starting datastore connection check...");
        if probe.probe().await.is_err() {
            warn!("Datastore not reachable at startup, letters will not be saved");
        }
    });

    Ok(persistence)
}
