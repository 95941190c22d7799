//! Response bodies from the Vault HTTP API

use crate::resource::{CredentialType, PolicyDocument, RemoteRoleState, RoleId};
use anyhow::{Context, Result};
use serde::Deserialize;

/// Envelope around every successful read: `{"request_id": ..., "data": {...}}`
#[derive(Debug, Deserialize)]
pub struct SecretResponse<T> {
    #[serde(default)]
    pub request_id: Option<String>,
    pub data: T,
}

/// `data` of `GET /v1/{mount}/roles/{name}`. Fields this crate does not
/// manage (TTLs, IAM groups, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct RoleData {
    pub credential_type: String,
    #[serde(default)]
    pub policy_document: Option<String>,
    #[serde(default)]
    pub policy_arns: Option<Vec<String>>,
    #[serde(default)]
    pub role_arns: Option<Vec<String>>,
}

impl RoleData {
    /// Normalize into [`RemoteRoleState`]: blank policies become `None`,
    /// null lists become empty.
    pub fn into_state(self, id: &RoleId) -> Result<RemoteRoleState> {
        let credential_type: CredentialType = self
            .credential_type
            .parse()
            .with_context(|| format!("Vault returned role {id} with an unsupported credential type"))?;

        let policy_document = self
            .policy_document
            .filter(|doc| !doc.trim().is_empty())
            .map(|doc| PolicyDocument::parse(&doc))
            .transpose()
            .with_context(|| format!("Vault returned role {id} with a policy that is not JSON"))?;

        Ok(RemoteRoleState {
            id: id.clone(),
            name: id.name().to_string(),
            backend: id.backend().to_string(),
            credential_type,
            policy_document,
            policy_arns: self.policy_arns.unwrap_or_default(),
            role_arns: self.role_arns.unwrap_or_default(),
        })
    }
}

/// `data` of a LIST request
#[derive(Debug, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub keys: Vec<String>,
}

/// Error body: `{"errors": ["..."]}`
#[derive(Debug, Deserialize)]
pub struct VaultErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_envelope_with_extra_fields() {
        let body = json!({
            "request_id": "5e8c6a2f",
            "lease_id": "",
            "renewable": false,
            "data": {
                "credential_type": "iam_user",
                "policy_document": "{\"Version\":\"2012-10-17\"}",
                "policy_arns": null,
                "role_arns": [],
                "default_sts_ttl": 0,
                "iam_groups": null
            }
        });
        let response: SecretResponse<RoleData> = serde_json::from_value(body).unwrap();
        let id = RoleId::new("aws", "inline").unwrap();
        let state = response.data.into_state(&id).unwrap();
        assert_eq!(state.credential_type, CredentialType::IamUser);
        assert!(state.policy_document.unwrap().matches_text(r#"{"Version": "2012-10-17"}"#));
        assert!(state.policy_arns.is_empty());
        assert_eq!(state.backend, "aws");
    }

    #[test]
    fn test_blank_policy_is_absent() {
        let data: RoleData = serde_json::from_value(json!({
            "credential_type": "assumed_role",
            "policy_document": "",
            "role_arns": ["arn:aws:iam::123456789123:role/foo"]
        }))
        .unwrap();
        let state = data.into_state(&RoleId::new("aws", "r").unwrap()).unwrap();
        assert_eq!(state.policy_document, None);
        assert_eq!(state.role_arns.len(), 1);
    }

    #[test]
    fn test_unknown_credential_type_is_an_error() {
        let data: RoleData =
            serde_json::from_value(json!({"credential_type": "session_token"})).unwrap();
        assert!(data.into_state(&RoleId::new("aws", "r").unwrap()).is_err());
    }
}
