use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::LocalFileStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tickets_server::config::AppConfig;
use tickets_server::database::init_db;
use tickets_server::seed::seed_catalog;
use tickets_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready");

    if std::env::args().any(|arg| arg == "--seed") {
        seed_catalog(&db).await.context("Failed to seed catalog")?;
    }

    let files = LocalFileStore::new(config.storage.public_root.clone())
        .await
        .context("Failed to prepare upload directory")?;
    info!(root = %config.storage.public_root.display(), "File store ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState::new(db, config, Arc::new(files));
    let app = tickets_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
