use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewPlot, Plot, PlotChanges, PlotRow};
use crate::database::store::{Page, PlotStore};

const PLOT_COLUMNS: &str =
    "id, plot_name, ST_AsText(plot_geometry) AS plot_geometry, plot_owner";

/// PostGIS-backed plot store. Geometry crosses the wire as WKT and is
/// re-validated on the way out.
#[derive(Clone)]
pub struct PgPlotStore {
    pool: PgPool,
}

impl PgPlotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn into_plot(row: PlotRow) -> Result<Plot, DatabaseError> {
        let id = row.id;
        Plot::try_from(row).map_err(|e| {
            DatabaseError::QueryError(format!("stored geometry for plot {} is unreadable: {}", id, e))
        })
    }
}

#[async_trait]
impl PlotStore for PgPlotStore {
    async fn insert(&self, plot: NewPlot) -> Result<Plot, DatabaseError> {
        let sql = format!(
            "INSERT INTO plots (plot_name, plot_geometry, plot_owner)
             VALUES ($1, ST_GeomFromText($2, 4326), $3)
             RETURNING {}",
            PLOT_COLUMNS
        );
        let row = sqlx::query_as::<_, PlotRow>(&sql)
            .bind(&plot.name)
            .bind(plot.geometry.to_wkt())
            .bind(&plot.owner)
            .fetch_one(&self.pool)
            .await?;
        Self::into_plot(row)
    }

    async fn list_by_owner(&self, owner: &str, page: Page) -> Result<Vec<Plot>, DatabaseError> {
        // LIMIT NULL means no limit in Postgres
        let sql = format!(
            "SELECT {} FROM plots WHERE plot_owner = $1 ORDER BY id ASC LIMIT $2 OFFSET $3",
            PLOT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlotRow>(&sql)
            .bind(owner)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::into_plot).collect()
    }

    async fn find_owned(&self, owner: &str, id: i64) -> Result<Option<Plot>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM plots WHERE plot_owner = $1 AND id = $2",
            PLOT_COLUMNS
        );
        let row = sqlx::query_as::<_, PlotRow>(&sql)
            .bind(owner)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::into_plot).transpose()
    }

    async fn update_owned(
        &self,
        owner: &str,
        id: i64,
        changes: &PlotChanges,
    ) -> Result<Option<Plot>, DatabaseError> {
        // ST_GeomFromText is strict, so a NULL geometry keeps the current value
        let sql = format!(
            "UPDATE plots
             SET plot_name = COALESCE($3, plot_name),
                 plot_geometry = COALESCE(ST_GeomFromText($4, 4326), plot_geometry)
             WHERE plot_owner = $1 AND id = $2
             RETURNING {}",
            PLOT_COLUMNS
        );
        let row = sqlx::query_as::<_, PlotRow>(&sql)
            .bind(owner)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.geometry.as_ref().map(|g| g.to_wkt()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::into_plot).transpose()
    }

    async fn delete_owned(&self, owner: &str, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM plots WHERE plot_owner = $1 AND id = $2")
            .bind(owner)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plots")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
