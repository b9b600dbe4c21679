use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::auth::{AuthError, Authenticator, Credential};
use crate::config::SecurityConfig;
use crate::database::models::{NewPlot, Plot, PlotChanges, PlotSummary};
use crate::database::{DatabaseError, Page, PlotStore, UserDirectory};
use crate::geometry::{GeometryError, Polygon};

/// Longest accepted plot name, matching the `plot_name` column.
pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("malformed geometry: {0}")]
    MalformedGeometry(#[from] GeometryError),

    #[error("user '{0}' does not exist")]
    UnknownOwner(String),

    #[error("plot {id} not found for user '{owner}'")]
    NotFound { owner: String, id: i64 },

    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    #[error("authenticated as '{actual}', cannot act for '{expected}'")]
    Forbidden { expected: String, actual: String },

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("authentication failed: {0}")]
    Auth(AuthError),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl PlotError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PlotError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<AuthError> for PlotError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => PlotError::Store(e),
            e if e.is_rejection() => PlotError::Unauthenticated(e.to_string()),
            e => {
                error!("Credential check failed internally: {}", e);
                PlotError::Auth(e)
            }
        }
    }
}

/// Fields an update may replace. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PlotPatch {
    pub name: Option<String>,
    pub ring_text: Option<String>,
}

/// Which operations demand a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    pub require_for_mutation: bool,
    pub require_for_create: bool,
}

impl From<&SecurityConfig> for AuthPolicy {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            require_for_mutation: security.require_auth_for_mutation,
            require_for_create: security.require_auth_for_create,
        }
    }
}

/// Create/list/update/delete for plots, with ownership and geometry checks
#[derive(Clone)]
pub struct PlotService {
    store: Arc<dyn PlotStore>,
    users: Arc<dyn UserDirectory>,
    authenticator: Arc<dyn Authenticator>,
    policy: AuthPolicy,
}

impl PlotService {
    pub fn new(
        store: Arc<dyn PlotStore>,
        users: Arc<dyn UserDirectory>,
        authenticator: Arc<dyn Authenticator>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            store,
            users,
            authenticator,
            policy,
        }
    }

    pub async fn create(
        &self,
        name: &str,
        ring_text: &str,
        owner: &str,
        credential: Option<&Credential>,
    ) -> Result<Plot, PlotError> {
        validate_name(name)?;
        if !self.users.user_exists(owner).await? {
            return Err(PlotError::UnknownOwner(owner.to_string()));
        }
        self.authorize(owner, credential, self.policy.require_for_create)
            .await?;

        let geometry = Polygon::parse(ring_text)?;

        let plot = self
            .store
            .insert(NewPlot {
                name: name.to_string(),
                geometry,
                owner: owner.to_string(),
            })
            .await
            .map_err(|e| match e {
                // Owner removed between the check and the insert
                DatabaseError::ForeignKeyViolation(_) => PlotError::UnknownOwner(owner.to_string()),
                other => PlotError::Store(other),
            })?;

        debug!("Created plot {} '{}' for {}", plot.id, plot.name, plot.owner);
        Ok(plot)
    }

    /// The owner's plots in ascending id order, with computed area
    pub async fn list_by_owner(&self, username: &str, page: Page) -> Result<Vec<PlotSummary>, PlotError> {
        if !self.users.user_exists(username).await? {
            return Err(PlotError::UnknownOwner(username.to_string()));
        }
        let plots = self.store.list_by_owner(username, page).await?;
        Ok(plots.iter().map(PlotSummary::from).collect())
    }

    pub async fn update(
        &self,
        username: &str,
        id: i64,
        credential: Option<&Credential>,
        patch: PlotPatch,
    ) -> Result<Plot, PlotError> {
        self.authorize(username, credential, self.policy.require_for_mutation)
            .await?;

        let current = self
            .store
            .find_owned(username, id)
            .await?
            .ok_or_else(|| not_found(username, id))?;

        // Everything is validated before the single write
        let geometry = patch.ring_text.as_deref().map(Polygon::parse).transpose()?;
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let changes = PlotChanges {
            name: patch.name,
            geometry,
        };
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .store
            .update_owned(username, id, &changes)
            .await?
            .ok_or_else(|| not_found(username, id))?;

        debug!("Updated plot {} for {}", id, username);
        Ok(updated)
    }

    pub async fn delete(&self, username: &str, id: i64, credential: Option<&Credential>) -> Result<(), PlotError> {
        self.authorize(username, credential, self.policy.require_for_mutation)
            .await?;

        if !self.store.delete_owned(username, id).await? {
            return Err(not_found(username, id));
        }
        debug!("Deleted plot {} for {}", id, username);
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), PlotError> {
        Ok(self.store.health_check().await?)
    }

    /// The credential must prove exactly `username`.
    async fn authorize(
        &self,
        username: &str,
        credential: Option<&Credential>,
        required: bool,
    ) -> Result<(), PlotError> {
        if !required {
            return Ok(());
        }
        let credential =
            credential.ok_or_else(|| PlotError::Unauthenticated("no credential supplied".to_string()))?;

        let identity = self.authenticator.authenticate(credential).await.map_err(|e| {
            warn!("Rejected {} credential for '{}': {}", credential.kind(), username, e);
            PlotError::from(e)
        })?;

        if identity.username != username {
            warn!("User '{}' attempted to act on plots of '{}'", identity.username, username);
            return Err(PlotError::Forbidden {
                expected: username.to_string(),
                actual: identity.username,
            });
        }
        Ok(())
    }
}

fn not_found(owner: &str, id: i64) -> PlotError {
    PlotError::NotFound {
        owner: owner.to_string(),
        id,
    }
}

fn validate_name(name: &str) -> Result<(), PlotError> {
    if name.trim().is_empty() {
        return Err(PlotError::validation("plot_name", "This field may not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(PlotError::validation(
            "plot_name",
            format!("Ensure this field has no more than {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}
