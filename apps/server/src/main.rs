use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use turnstile_db::{Database, DbConfig};
use turnstile_server::{create_router, sweeper, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    info!("Starting Turnstile reservation server");

    let config = ServerConfig::load().context("loading configuration")?;

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("opening database")?;

    // Background expiry sweeper; the request path never depends on it.
    tokio::spawn(sweeper::run(db.clone(), config.sweep_interval_secs));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(db, config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
