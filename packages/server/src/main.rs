use anyhow::Context;
use tracing::{Level, info};

use ctf_server::config::AppConfig;
use ctf_server::state::AppState;
use ctf_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create required indexes")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState { db, config });

    info!("Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
