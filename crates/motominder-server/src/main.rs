//! MotoMinder HTTP server

use anyhow::Context;
use motominder_core::config::Config;
use motominder_core::storage::Database;
use motominder_server::{AppState, build_router};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("motominder=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = Config::load()?.with_env_overrides()?;
    let db = Database::new(config.database_config()).await?;
    info!(path = %db.path().display(), "Database ready");

    let state = AppState::new(db.clone()).with_internal_errors(config.server.expose_internal_errors);
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
