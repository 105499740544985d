mod ai;
mod config;
mod errors;
mod jobs;
mod models;
mod resumes;
mod routes;
mod session;
mod state;
mod storage;
mod stores;
mod workspace;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::GeminiClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::session::Session;
use crate::state::AppState;
use crate::storage::{BlobStore, FileBlobStore, JobStorage, MemoryBlobStore, ResumeStorage};

/// `DATA_DIR` value that keeps everything in memory.
const IN_MEMORY_DATA_DIR: &str = ":memory:";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Applyr API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_blob_store(&config);
    let session = Session::load(
        ResumeStorage::new(store.clone()),
        JobStorage::new(store),
    );

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; AI features will fail until it is configured");
    }
    let ai = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("AI client initialized (model: {})", ai.model());

    let state = AppState::new(session, Arc::new(ai), config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_blob_store(config: &Config) -> Arc<dyn BlobStore> {
    if config.data_dir.as_os_str() == IN_MEMORY_DATA_DIR {
        info!("Using in-memory storage (quota {} bytes)", config.storage_quota_bytes);
        return Arc::new(MemoryBlobStore::new(Some(config.storage_quota_bytes)));
    }

    let store = FileBlobStore::new(config.data_dir.clone(), config.storage_quota_bytes);
    info!(
        "Using file storage at {} (quota {} bytes)",
        store.dir().display(),
        config.storage_quota_bytes
    );
    Arc::new(store)
}
