pub mod migrate;
pub mod token;
pub mod user;

use anyhow::Context;
use sqlx::PgPool;

use crate::config::config;
use crate::database::DatabaseManager;

/// Pool for the configured DATABASE_URL
pub(crate) async fn connect() -> anyhow::Result<PgPool> {
    let database = &config().database;
    DatabaseManager::connect(database)
        .await
        .context("failed to connect to database (is DATABASE_URL set?)")
}
