use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewPlot, Plot, PlotChanges, User};
use crate::database::store::{Page, PlotStore, UserDirectory};

/// Process-local plot store with the same contract as the Postgres one,
/// including the owner foreign key when built with `with_users`.
#[derive(Default)]
pub struct InMemoryPlotStore {
    plots: RwLock<BTreeMap<i64, Plot>>,
    next_id: AtomicI64,
    users: Option<Arc<InMemoryUserDirectory>>,
}

impl InMemoryPlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inserts for owners missing from `users`, like the `plots.plot_owner` FK.
    pub fn with_users(users: Arc<InMemoryUserDirectory>) -> Self {
        Self {
            users: Some(users),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PlotStore for InMemoryPlotStore {
    async fn insert(&self, plot: NewPlot) -> Result<Plot, DatabaseError> {
        if let Some(users) = &self.users {
            if !users.user_exists(&plot.owner).await? {
                return Err(DatabaseError::ForeignKeyViolation(format!(
                    "owner '{}' is not present in users",
                    plot.owner
                )));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let plot = Plot {
            id,
            name: plot.name,
            geometry: plot.geometry,
            owner: plot.owner,
        };
        self.plots.write().await.insert(id, plot.clone());
        Ok(plot)
    }

    async fn list_by_owner(&self, owner: &str, page: Page) -> Result<Vec<Plot>, DatabaseError> {
        let plots = self.plots.read().await;
        let owned = plots
            .values()
            .filter(|p| p.owner == owner)
            .skip(page.offset.max(0) as usize)
            .cloned();
        Ok(match page.limit {
            Some(limit) => owned.take(limit.max(0) as usize).collect(),
            None => owned.collect(),
        })
    }

    async fn find_owned(&self, owner: &str, id: i64) -> Result<Option<Plot>, DatabaseError> {
        let plots = self.plots.read().await;
        Ok(plots.get(&id).filter(|p| p.owner == owner).cloned())
    }

    async fn update_owned(
        &self,
        owner: &str,
        id: i64,
        changes: &PlotChanges,
    ) -> Result<Option<Plot>, DatabaseError> {
        let mut plots = self.plots.write().await;
        match plots.get_mut(&id).filter(|p| p.owner == owner) {
            Some(plot) => {
                changes.apply_to(plot);
                Ok(Some(plot.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_owned(&self, owner: &str, id: i64) -> Result<bool, DatabaseError> {
        let mut plots = self.plots.write().await;
        if plots.get(&id).is_some_and(|p| p.owner == owner) {
            plots.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.plots.read().await.len() as i64)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, username: &str, password_hash: &str) {
        let user = User {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.users.write().await.insert(username.to_string(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(username).cloned())
    }
}
