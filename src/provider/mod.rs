//! # Provider Modules
//!
//! Remote collaborators of the reconciler.
//!
//! - `RoleClient`: CRUD on AWS secrets engine roles
//! - `MountClient`: mounting, configuring and unmounting the engine itself
//!
//! `vault` holds the HTTP implementation of both traits.

use crate::reconciler::ValidatedRole;
use crate::resource::{RemoteRoleState, RoleId};
use anyhow::Result;
use async_trait::async_trait;
use zeroize::Zeroizing;

/// Client for role resources under a mounted AWS secrets engine
#[async_trait]
pub trait RoleClient: Send + Sync {
    /// Create or replace the role, then read back what the server stored.
    /// Every field is sent so nothing from a previous write survives.
    async fn write(&self, id: &RoleId, role: &ValidatedRole) -> Result<RemoteRoleState>;

    /// Read the role; `None` if it does not exist
    async fn read(&self, id: &RoleId) -> Result<Option<RemoteRoleState>>;

    /// Delete the role. Deleting a role that does not exist succeeds.
    async fn delete(&self, id: &RoleId) -> Result<()>;
}

/// Client for the AWS secrets engine mounts that roles live under
#[async_trait]
pub trait MountClient: Send + Sync {
    /// Enable an AWS secrets engine at `mount.path` and write its root credentials
    async fn mount(&self, mount: &BackendMount) -> Result<()>;

    /// Disable the engine at `path`; succeeds if nothing is mounted there
    async fn unmount(&self, path: &str) -> Result<()>;

    /// Names of the roles under `path` (empty when there are none)
    async fn list_roles(&self, path: &str) -> Result<Vec<String>>;
}

/// An AWS secrets engine mount and the root credentials it signs with
#[derive(Clone)]
pub struct BackendMount {
    pub path: String,
    pub access_key: String,
    pub secret_key: Zeroizing<String>,
    pub region: String,
}

impl BackendMount {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            access_key: access_key.into(),
            secret_key: Zeroizing::new(secret_key.into()),
            region: region.into(),
        }
    }
}

impl std::fmt::Debug for BackendMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendMount")
            .field("path", &self.path)
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

pub mod vault;

pub use vault::VaultRoleClient;
