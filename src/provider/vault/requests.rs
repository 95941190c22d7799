//! Request bodies for the Vault HTTP API

use crate::constants::AWS_ENGINE_TYPE;
use crate::reconciler::ValidatedRole;
use serde::Serialize;

/// Body of `POST /v1/{mount}/roles/{name}`
///
/// Vault merges a role write into the existing entry, so every field is
/// always present: unset fields go out as `""` / `[]` and clear whatever a
/// previous write stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteRoleRequest {
    pub credential_type: &'static str,
    pub policy_document: String,
    pub policy_arns: Vec<String>,
    pub role_arns: Vec<String>,
}

impl From<&ValidatedRole> for WriteRoleRequest {
    fn from(role: &ValidatedRole) -> Self {
        let spec = role.spec();
        Self {
            credential_type: spec.credential_type().as_str(),
            policy_document: spec
                .policy_document()
                .map(|doc| doc.to_compact_string())
                .unwrap_or_default(),
            policy_arns: spec.policy_arns().to_vec(),
            role_arns: spec.role_arns().to_vec(),
        }
    }
}

/// Body of `POST /v1/sys/mounts/{path}`
#[derive(Debug, Clone, Serialize)]
pub struct MountEngineRequest {
    #[serde(rename = "type")]
    pub engine_type: &'static str,
    pub description: String,
}

impl MountEngineRequest {
    #[must_use]
    pub fn aws(description: impl Into<String>) -> Self {
        Self {
            engine_type: AWS_ENGINE_TYPE,
            description: description.into(),
        }
    }
}

/// Body of `POST /v1/{mount}/config/root`
#[derive(Clone, Serialize)]
pub struct ConfigureRootRequest<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
}

impl std::fmt::Debug for ConfigureRootRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigureRootRequest")
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
