//! # Prelude
//!
//! Re-exports commonly used types for convenience.
//!
//! ```rust
//! use vault_role_provider::prelude::*;
//!
//! let config = RoleConfig::new("deploy", "aws", "assumed_role")
//!     .with_role_arns(["arn:aws:iam::123456789123:role/deploy"]);
//! let role = resolve(&config).unwrap();
//! assert_eq!(role.spec().credential_type(), CredentialType::AssumedRole);
//! ```

pub use crate::acceptance::{Scenario, ScenarioError, ScenarioRunner};
pub use crate::config::{AcceptanceConfig, VaultClientConfig};
pub use crate::provider::{BackendMount, MountClient, RoleClient, VaultRoleClient};
pub use crate::reconciler::{
    resolve, CredentialSpec, ReconcileError, Reconciler, ValidatedRole, ValidationError,
};
pub use crate::resource::{CredentialType, RemoteRoleState, RoleConfig, RoleId};
