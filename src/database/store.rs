use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewPlot, Plot, PlotChanges, User};

/// Window over an owner's plots, always in ascending id order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Persistence for plot records. Every lookup that names a plot is scoped by
/// owner, so a plot can only be read or changed through its owner's username.
#[async_trait]
pub trait PlotStore: Send + Sync {
    /// Insert and return the plot with its assigned id.
    async fn insert(&self, plot: NewPlot) -> Result<Plot, DatabaseError>;

    async fn list_by_owner(&self, owner: &str, page: Page) -> Result<Vec<Plot>, DatabaseError>;

    async fn find_owned(&self, owner: &str, id: i64) -> Result<Option<Plot>, DatabaseError>;

    /// Apply `changes` in a single write. `None` if no such plot.
    async fn update_owned(
        &self,
        owner: &str,
        id: i64,
        changes: &PlotChanges,
    ) -> Result<Option<Plot>, DatabaseError>;

    /// `true` if a row was removed.
    async fn delete_owned(&self, owner: &str, id: i64) -> Result<bool, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Read access to the externally managed user table.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn user_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        Ok(self.find_user(username).await?.is_some())
    }
}
