//! # Reconciler
//!
//! Maps desired [`RoleConfig`] state onto the remote role API.
//!
//! ## Flow
//!
//! 1. Resolve the configuration into a [`ValidatedRole`] (no network on failure)
//! 2. Derive the [`RoleId`] from `(backend, name)`
//! 3. Write the role and return the state Vault reports back
//!
//! The reconciler keeps no state between calls and never retries; remote
//! failures reach the caller unchanged as [`ReconcileError::Transport`].

pub mod resolver;

pub use resolver::{resolve, CredentialSpec, PolicyCredentialType, ValidatedRole, ValidationError};

use crate::observability::metrics;
use crate::provider::RoleClient;
use crate::resource::{RemoteRoleState, RoleConfig, RoleId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid role configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("role {0} does not exist")]
    NotFound(RoleId),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ReconcileError {
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Applies, refreshes, imports and destroys roles through a [`RoleClient`]
#[derive(Clone)]
pub struct Reconciler {
    client: Arc<dyn RoleClient>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(client: Arc<dyn RoleClient>) -> Self {
        Self { client }
    }

    /// Create or update the role described by `config`
    ///
    /// # Errors
    /// `Validation` before any request is sent, `Transport` if the write fails
    pub async fn apply(&self, config: &RoleConfig) -> Result<RemoteRoleState, ReconcileError> {
        let role = resolve(config).map_err(|e| {
            warn!("Rejected role configuration {:?}: {}", config.name, e);
            metrics::increment_validation_errors();
            e
        })?;
        let id = RoleId::new(role.backend(), role.name()).map_err(ValidationError::from)?;

        info!(
            "Applying role {} (credential_type={})",
            id,
            role.spec().credential_type()
        );
        let state = self.client.write(&id, &role).await?;
        debug!("Role {} applied", state.id);
        Ok(state)
    }

    /// Current remote state of `id`; `None` when the role does not exist
    ///
    /// # Errors
    /// `Transport` if the read fails
    pub async fn refresh(&self, id: &RoleId) -> Result<Option<RemoteRoleState>, ReconcileError> {
        Ok(self.client.read(id).await?)
    }

    /// Delete `id`. Deleting an absent role succeeds.
    ///
    /// # Errors
    /// `Transport` if the delete fails
    pub async fn destroy(&self, id: &RoleId) -> Result<(), ReconcileError> {
        info!("Destroying role {}", id);
        self.client.delete(id).await?;
        Ok(())
    }

    /// Reconstruct the configuration of an existing role from its identifier
    ///
    /// # Errors
    /// `Validation` for a malformed identifier, `NotFound` if the role is
    /// absent, `Transport` if the read fails
    pub async fn import(&self, id: &str) -> Result<RoleConfig, ReconcileError> {
        let id = RoleId::parse(id).map_err(ValidationError::from)?;
        info!("Importing role {}", id);
        match self.refresh(&id).await? {
            Some(state) => Ok(state.to_config()),
            None => Err(ReconcileError::NotFound(id)),
        }
    }
}
