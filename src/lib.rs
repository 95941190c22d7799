//! Vault AWS Secret Backend Role Provider Library
//!
//! Declarative management of `aws/roles/<name>` entries in HashiCorp Vault's
//! AWS secrets engine, plus the acceptance oracle that verifies it end to end.
//!
//! - [`resource`]: desired and remote role state, identifiers, policy documents
//! - [`reconciler`]: credential-mode resolution and apply/refresh/import/destroy
//! - [`provider`]: the remote role and mount clients, with a Vault HTTP implementation
//! - [`acceptance`]: scenario runner, checks and the built-in scenarios
//! - [`config`], [`observability`]: environment configuration, logging and metrics

pub mod acceptance;
pub mod config;
pub mod constants;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod reconciler;
pub mod resource;

/// Build metadata injected by `build.rs`
pub const BUILD_GIT_HASH: &str = env!("BUILD_GIT_HASH");
pub const BUILD_DATETIME: &str = env!("BUILD_DATETIME");

/// Version string printed by the binaries: `<version> (<git hash>, <build time>)`
#[must_use]
pub fn version_string() -> String {
    format!(
        "{} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_GIT_HASH,
        BUILD_DATETIME
    )
}
