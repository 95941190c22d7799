//! # Role Identifiers
//!
//! The remote identifier of a role is its Vault API path without the `/v1/`
//! prefix: `<backend>/roles/<name>`. It is derived from `(backend, name)` and
//! is the only input import needs.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use vault_paths::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed role identifier {0:?}: expected <backend>/roles/<name>")]
pub struct MalformedRoleId(pub String);

/// Identifier of a role inside a mounted AWS secrets engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleId {
    backend: String,
    name: String,
}

impl RoleId {
    /// Derive the identifier for `name` under `backend`.
    ///
    /// The backend is normalized (surrounding slashes trimmed) so `aws/` and
    /// `aws` address the same role.
    pub fn new(backend: &str, name: &str) -> Result<Self, MalformedRoleId> {
        let path = PathBuilder::new()
            .operation(VaultOperation::ReadRole)
            .mount(backend)
            .role(name)
            .build_resource_id()
            .map_err(|e| MalformedRoleId(format!("{backend}/roles/{name} ({e})")))?;
        Self::parse(&path)
    }

    /// Parse an identifier produced by [`RoleId::new`] or copied from Vault.
    pub fn parse(id: &str) -> Result<Self, MalformedRoleId> {
        split_role_path(id)
            .map(|(backend, name)| Self {
                backend: backend.to_string(),
                name: name.to_string(),
            })
            .ok_or_else(|| MalformedRoleId(id.to_string()))
    }

    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.backend, ROLES_SEGMENT, self.name)
    }
}

impl FromStr for RoleId {
    type Err = MalformedRoleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RoleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_from_backend_and_name() {
        let id = RoleId::new("tf-test-aws-1", "deploy").unwrap();
        assert_eq!(id.to_string(), "tf-test-aws-1/roles/deploy");
        assert_eq!(id.backend(), "tf-test-aws-1");
        assert_eq!(id.name(), "deploy");
    }

    #[test]
    fn test_backend_slashes_are_normalized() {
        assert_eq!(
            RoleId::new("/aws/", "deploy").unwrap(),
            RoleId::new("aws", "deploy").unwrap()
        );
    }

    #[test]
    fn test_nested_backend_round_trip() {
        let id = RoleId::new("tf-test-aws/nested", "reader").unwrap();
        let parsed: RoleId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.backend(), "tf-test-aws/nested");
    }

    #[test]
    fn test_malformed_identifiers() {
        for bad in ["", "aws", "aws/roles/", "roles/deploy", "aws/roles/a/b", "aws/creds/x"] {
            assert!(RoleId::parse(bad).is_err(), "{bad:?} should not parse");
        }
        assert!(RoleId::new("", "deploy").is_err());
        assert!(RoleId::new("aws", "").is_err());
        assert!(RoleId::new("aws", "a/b").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = RoleId::new("aws", "deploy").unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), "aws/roles/deploy");
    }
}
