use std::sync::Arc;

use anyhow::Context;
use plots_api::app::{self, AppState};
use plots_api::database::{DatabaseManager, PgPlotStore, PgUserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    plots_api::logging::init("plots_api=info,tower_http=info");

    // Initialize configuration (this loads the config singleton)
    let config = plots_api::config::config().clone();
    tracing::info!("Starting Plots API in {:?} mode", config.environment);

    if plots_api::is_production!() && !config.security.require_auth_for_mutation {
        tracing::warn!("Mutation authentication is disabled in production");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("migration failed")?;
    }

    let store = Arc::new(PgPlotStore::new(pool.clone()));
    let users = Arc::new(PgUserDirectory::new(pool.clone()));
    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store, users).context("invalid security configuration")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Plots API listening on http://{}", bind_addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Plots API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
