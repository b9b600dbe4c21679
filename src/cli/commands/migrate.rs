use anyhow::Context;

use crate::cli::{output::output_success, OutputFormat};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = super::connect().await?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;
    pool.close().await;

    output_success(output_format, "Database schema is up to date", None)
}
