//! Shared API path definitions for the Vault AWS secrets engine
//!
//! This crate centralizes all API paths to ensure consistency
//! between the role client and the mock server implementations.
//!
//! ## Quick Start
//!
//! ```rust
//! use vault_paths::prelude::*;
//!
//! let path = PathBuilder::new()
//!     .operation(VaultOperation::WriteRole)
//!     .mount("aws")
//!     .role("deploy")
//!     .build_http_path();
//! assert_eq!(path.unwrap(), "aws/roles/deploy");
//! ```
//!
//! ## Identifiers
//!
//! A role's remote identifier is its API path without the `/v1/` prefix
//! (`<mount>/roles/<name>`). [`split_role_path`] turns an identifier back
//! into its mount and role name; mounts may themselves contain slashes.

pub mod builder;
pub mod errors;
pub mod formats;
pub mod operations;
pub mod prelude;

/// API version prefix used by every Vault HTTP endpoint
pub const API_PREFIX: &str = "/v1/";

/// Path segment separating a mount from its role names
pub const ROLES_SEGMENT: &str = "roles";

/// Path of the mount management endpoint (relative to the API prefix)
pub const SYS_MOUNTS: &str = "sys/mounts";

/// Normalize a mount path: strip surrounding slashes and whitespace.
#[must_use]
pub fn normalize_mount(mount: &str) -> &str {
    mount.trim().trim_matches('/')
}

/// Split `<mount>/roles/<name>` into `(mount, name)`.
///
/// The split happens at the last `/roles/` so nested mounts such as
/// `team/aws/roles/deploy` resolve to `("team/aws", "deploy")`.
/// A leading `/v1/` is ignored. Returns `None` when either side is empty
/// or the name contains a slash.
#[must_use]
pub fn split_role_path(path: &str) -> Option<(&str, &str)> {
    let path = path.strip_prefix(API_PREFIX).unwrap_or(path);
    let path = path.trim_matches('/');
    let marker = format!("/{ROLES_SEGMENT}/");
    let idx = path.rfind(&marker)?;
    let mount = &path[..idx];
    let name = &path[idx + marker.len()..];
    if mount.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((mount, name))
}
