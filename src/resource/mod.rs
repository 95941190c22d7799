//! # Role Resource Model
//!
//! Desired state ([`RoleConfig`]) as supplied by the host, and the normalized
//! view of what Vault stores ([`RemoteRoleState`]).
//!
//! - `id`: remote identifiers (`<backend>/roles/<name>`)
//! - `policy`: inline policy documents compared by JSON value
//! - `attributes`: the flat attribute map the host and the acceptance checks read
//! - `loader`: reading role definitions from YAML or JSON files

pub mod attributes;
pub mod id;
pub mod loader;
pub mod policy;

pub use attributes::Attributes;
pub use id::{MalformedRoleId, RoleId};
pub use loader::load_role_configs;
pub use policy::{policies_equivalent, PolicyDocument};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use vault_paths::normalize_mount;

/// Strategy Vault uses to mint AWS credentials for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    IamUser,
    AssumedRole,
    FederationToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown credential type {0:?}")]
pub struct UnknownCredentialType(pub String);

impl CredentialType {
    pub const ALL: [Self; 3] = [Self::IamUser, Self::AssumedRole, Self::FederationToken];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IamUser => "iam_user",
            Self::AssumedRole => "assumed_role",
            Self::FederationToken => "federation_token",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = UnknownCredentialType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownCredentialType(s.to_string()))
    }
}

/// Desired state of a `vault_aws_secret_backend_role`
///
/// Field names match the host schema block. `credential_type` is kept as the
/// raw string so unknown values reach the resolver and are rejected there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    /// Role name, unique within the backend
    pub name: String,
    /// Mount path of the AWS secrets engine
    pub backend: String,
    /// One of `iam_user`, `assumed_role`, `federation_token`
    pub credential_type: String,
    /// Inline IAM policy (JSON text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<String>,
    /// Managed policy ARNs attached to the IAM user
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policy_arns: Vec<String>,
    /// Role ARNs that may be assumed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role_arns: Vec<String>,
}

impl RoleConfig {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        backend: impl Into<String>,
        credential_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            credential_type: credential_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_policy_document(mut self, document: impl Into<String>) -> Self {
        self.policy_document = Some(document.into());
        self
    }

    #[must_use]
    pub fn with_policy_arns<I, S>(mut self, arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy_arns = arns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_role_arns<I, S>(mut self, arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_arns = arns.into_iter().map(Into::into).collect();
        self
    }

    /// The inline policy text, with a blank document treated as absent
    #[must_use]
    pub fn policy_document(&self) -> Option<&str> {
        self.policy_document
            .as_deref()
            .filter(|doc| !doc.trim().is_empty())
    }

    /// Field-wise equality, comparing policies by JSON value and backends
    /// after normalization. Used to check imported state against the
    /// configuration that produced it.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        let policies_match = match (self.policy_document(), other.policy_document()) {
            (None, None) => true,
            (Some(left), Some(right)) => policies_equivalent(left, right),
            _ => false,
        };

        self.name == other.name
            && normalize_mount(&self.backend) == normalize_mount(&other.backend)
            && self.credential_type == other.credential_type
            && policies_match
            && self.policy_arns == other.policy_arns
            && self.role_arns == other.role_arns
    }
}

/// Normalized view of a role as stored by Vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRoleState {
    pub id: RoleId,
    pub name: String,
    pub backend: String,
    pub credential_type: CredentialType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<PolicyDocument>,
    pub policy_arns: Vec<String>,
    pub role_arns: Vec<String>,
}

impl RemoteRoleState {
    /// Reconstruct the configuration that describes this role (import)
    #[must_use]
    pub fn to_config(&self) -> RoleConfig {
        RoleConfig {
            name: self.name.clone(),
            backend: self.backend.clone(),
            credential_type: self.credential_type.as_str().to_string(),
            policy_document: self
                .policy_document
                .as_ref()
                .map(PolicyDocument::to_compact_string),
            policy_arns: self.policy_arns.clone(),
            role_arns: self.role_arns.clone(),
        }
    }

    /// Flatten into the host's attribute map
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("id", self.id.to_string());
        attrs.insert("name", self.name.clone());
        attrs.insert("backend", self.backend.clone());
        attrs.insert("credential_type", self.credential_type.as_str());
        if let Some(doc) = &self.policy_document {
            attrs.insert("policy_document", doc.to_compact_string());
        }
        attrs.insert_list("policy_arns", &self.policy_arns);
        attrs.insert_list("role_arns", &self.role_arns);
        attrs
    }
}
