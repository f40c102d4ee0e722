use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use transit_server::config::{EngineConfig, ServerConfig};
use transit_server::engine::TransitEngine;
use transit_server::storage::JsonFileStore;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    let store = JsonFileStore::new(&config.data_dir).expect("Failed to open data directory");
    info!(data_dir = %config.data_dir.display(), "using JSON file store");

    let engine = TransitEngine::load(Arc::new(store), EngineConfig::default())
        .expect("Failed to load transit data");

    let app = create_router(AppState::new(engine));

    info!(addr = %config.bind_addr, "transit server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
