//! In-memory mount and role store
//!
//! Mirrors the parts of Vault's behaviour the role client depends on:
//! - role writes merge into the existing entry (absent fields keep their value)
//! - inline policies are validated as JSON and stored compacted
//! - `role_arns` is only accepted with `credential_type = assumed_role`
//! - unmounting an engine drops every role under it
//!
//! This is ephemeral - data does not persist across restarts.
//! Thread-safe using Arc<RwLock> for concurrent access.

use crate::errors::VaultError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use vault_paths::normalize_mount;

const CREDENTIAL_TYPES: [&str; 3] = ["iam_user", "assumed_role", "federation_token"];

/// Root credentials written to `<mount>/config/root`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootConfig {
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub region: String,
}

/// A stored AWS secrets engine role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoredRole {
    pub credential_type: String,
    pub policy_document: String,
    pub policy_arns: Vec<String>,
    pub role_arns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct MountEntry {
    engine_type: String,
    description: String,
    root: Option<RootConfig>,
    roles: BTreeMap<String, StoredRole>,
}

/// Summary of a mount, as returned by `GET /v1/sys/mounts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountInfo {
    #[serde(rename = "type")]
    pub engine_type: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct VaultStore {
    mounts: Arc<RwLock<BTreeMap<String, MountEntry>>>,
}

impl VaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable an engine at `path`
    pub async fn mount(
        &self,
        path: &str,
        engine_type: &str,
        description: &str,
    ) -> Result<(), VaultError> {
        let path = normalize_mount(path);
        if path.is_empty() {
            return Err(VaultError::bad_request("missing mount path"));
        }
        if engine_type.is_empty() {
            return Err(VaultError::bad_request("missing engine type"));
        }

        let mut mounts = self.mounts.write().await;
        if mounts.contains_key(path) {
            return Err(VaultError::bad_request(format!(
                "path is already in use at {path}/"
            )));
        }
        info!("  Mounted {} engine at {}/", engine_type, path);
        mounts.insert(
            path.to_string(),
            MountEntry {
                engine_type: engine_type.to_string(),
                description: description.to_string(),
                ..MountEntry::default()
            },
        );
        Ok(())
    }

    /// Disable the engine at `path` together with its roles. Absent mounts are ignored.
    pub async fn unmount(&self, path: &str) {
        if self.mounts.write().await.remove(normalize_mount(path)).is_some() {
            info!("  Unmounted {}/", normalize_mount(path));
        }
    }

    pub async fn mounts(&self) -> BTreeMap<String, MountInfo> {
        self.mounts
            .read()
            .await
            .iter()
            .map(|(path, entry)| {
                (
                    format!("{path}/"),
                    MountInfo {
                        engine_type: entry.engine_type.clone(),
                        description: entry.description.clone(),
                    },
                )
            })
            .collect()
    }

    /// Split a request path into `(mount, remainder)` using the longest mounted prefix
    pub async fn resolve_mount(&self, path: &str) -> Option<(String, String)> {
        let path = path.trim_matches('/');
        let mounts = self.mounts.read().await;
        mounts
            .keys()
            .filter(|mount| {
                path == mount.as_str()
                    || path
                        .strip_prefix(mount.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|mount| mount.len())
            .map(|mount| {
                let rest = path[mount.len()..].trim_start_matches('/').to_string();
                (mount.clone(), rest)
            })
    }

    pub async fn configure_root(&self, mount: &str, root: RootConfig) -> Result<(), VaultError> {
        let mut mounts = self.mounts.write().await;
        let entry = mounts
            .get_mut(mount)
            .ok_or_else(|| VaultError::no_handler(&format!("{mount}/config/root")))?;
        entry.root = Some(root);
        Ok(())
    }

    pub async fn root_config(&self, mount: &str) -> Option<RootConfig> {
        self.mounts.read().await.get(mount)?.root.clone()
    }

    /// Create or update a role from a request body, merging with any existing entry
    pub async fn write_role(&self, mount: &str, name: &str, body: &Value) -> Result<(), VaultError> {
        let fields = body
            .as_object()
            .ok_or_else(|| VaultError::bad_request("request body must be a JSON object"))?;

        let mut mounts = self.mounts.write().await;
        let entry = mounts
            .get_mut(mount)
            .ok_or_else(|| VaultError::no_handler(&format!("{mount}/roles/{name}")))?;

        let mut role = entry.roles.get(name).cloned().unwrap_or_default();
        if let Some(credential_type) = string_field(fields, "credential_type")? {
            role.credential_type = credential_type;
        }
        if let Some(policy_document) = string_field(fields, "policy_document")? {
            role.policy_document = compact_policy(&policy_document)?;
        }
        if let Some(policy_arns) = list_field(fields, "policy_arns")? {
            role.policy_arns = policy_arns;
        }
        if let Some(role_arns) = list_field(fields, "role_arns")? {
            role.role_arns = role_arns;
        }

        if role.credential_type.is_empty() {
            return Err(VaultError::bad_request("did not supply credential_type"));
        }
        if !CREDENTIAL_TYPES.contains(&role.credential_type.as_str()) {
            return Err(VaultError::bad_request(format!(
                "unrecognized credential_type: {}",
                role.credential_type
            )));
        }
        if !role.role_arns.is_empty() && role.credential_type != "assumed_role" {
            return Err(VaultError::bad_request(format!(
                "cannot supply role_arns when credential_type isn't assumed_role (got {})",
                role.credential_type
            )));
        }

        info!("  Wrote role {}/roles/{}", mount, name);
        entry.roles.insert(name.to_string(), role);
        Ok(())
    }

    pub async fn read_role(&self, mount: &str, name: &str) -> Option<StoredRole> {
        self.mounts.read().await.get(mount)?.roles.get(name).cloned()
    }

    /// Delete a role; deleting an absent role succeeds
    pub async fn delete_role(&self, mount: &str, name: &str) {
        if let Some(entry) = self.mounts.write().await.get_mut(mount) {
            if entry.roles.remove(name).is_some() {
                info!("  Deleted role {}/roles/{}", mount, name);
            }
        }
    }

    pub async fn list_roles(&self, mount: &str) -> Vec<String> {
        self.mounts
            .read()
            .await
            .get(mount)
            .map(|entry| entry.roles.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, VaultError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(VaultError::bad_request(format!(
            "error converting input for field {key:?}: expected string, got {other}"
        ))),
    }
}

/// Lists arrive as JSON arrays or comma-separated strings
fn list_field(fields: &Map<String, Value>, key: &str) -> Result<Option<Vec<String>>, VaultError> {
    let invalid = || VaultError::bad_request(format!("error converting input for field {key:?}"));
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}

fn compact_policy(document: &str) -> Result<String, VaultError> {
    if document.trim().is_empty() {
        return Ok(String::new());
    }
    let value: Value = serde_json::from_str(document)
        .map_err(|e| VaultError::bad_request(format!("cannot parse policy document: {e}")))?;
    Ok(value.to_string())
}
