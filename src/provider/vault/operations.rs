//! RoleClient and MountClient over the Vault HTTP API

use super::common::OperationTracker;
use super::{
    ConfigureRootRequest, ListData, MountEngineRequest, RoleData, SecretResponse,
    VaultRoleClient, WriteRoleRequest,
};
use crate::provider::{BackendMount, MountClient, RoleClient};
use crate::reconciler::ValidatedRole;
use crate::resource::{RemoteRoleState, RoleId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::field::Empty;
use tracing::{debug, info, info_span, Instrument};
use vault_paths::prelude::*;

fn role_path(operation: VaultOperation, id: &RoleId) -> Result<String> {
    Ok(PathBuilder::new()
        .operation(operation)
        .mount(id.backend())
        .role(id.name())
        .build_http_path()?)
}

fn mount_path(operation: VaultOperation, mount: &str) -> Result<String> {
    Ok(PathBuilder::new()
        .operation(operation)
        .mount(mount)
        .build_http_path()?)
}

impl VaultRoleClient {
    /// Send a request; `404` counts as success when `allow_missing` is set
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        allow_missing: bool,
    ) -> Result<()> {
        let response = self
            .make_request(method.clone(), path, body)?
            .send()
            .await
            .with_context(|| format!("Failed to send {method} {path}"))?;

        let status = response.status();
        if status.is_success() || (allow_missing && status == StatusCode::NOT_FOUND) {
            return Ok(());
        }
        let error_text = response.text().await.unwrap_or_default();
        Err(Self::handle_error_response(status, &error_text))
    }

    async fn write_role(&self, id: &RoleId, role: &ValidatedRole) -> Result<RemoteRoleState> {
        let path = role_path(VaultOperation::WriteRole, id)?;
        let body = serde_json::to_value(WriteRoleRequest::from(role))?;
        info!("Writing Vault role: {}", id);
        self.send(Method::POST, &path, Some(body), false).await?;

        self.read_role(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Vault role {id} not found after write"))
    }

    async fn read_role(&self, id: &RoleId) -> Result<Option<RemoteRoleState>> {
        let path = role_path(VaultOperation::ReadRole, id)?;
        let response = self
            .make_request(Method::GET, &path, None)?
            .send()
            .await
            .context("Failed to read role")?;

        match response.status() {
            status if status.is_success() => {
                let body: SecretResponse<RoleData> = response
                    .json()
                    .await
                    .context("Failed to parse role response")?;
                body.data.into_state(id).map(Some)
            }
            StatusCode::NOT_FOUND => {
                debug!("Role {} does not exist", id);
                Ok(None)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(Self::handle_error_response(status, &error_text))
            }
        }
    }

    async fn delete_role(&self, id: &RoleId) -> Result<()> {
        let path = role_path(VaultOperation::DeleteRole, id)?;
        info!("Deleting Vault role: {}", id);
        self.send(Method::DELETE, &path, None, true).await
    }

    async fn mount_engine(&self, mount: &BackendMount) -> Result<()> {
        let path = mount_path(VaultOperation::MountEngine, &mount.path)?;
        let body = serde_json::to_value(MountEngineRequest::aws(format!(
            "AWS secrets engine for {}",
            mount.path
        )))?;
        info!("Mounting AWS secrets engine at {}", mount.path);
        self.send(Method::POST, &path, Some(body), false).await?;

        let config_path = mount_path(VaultOperation::ConfigureRoot, &mount.path)?;
        let config = serde_json::to_value(ConfigureRootRequest {
            access_key: &mount.access_key,
            secret_key: mount.secret_key.as_str(),
            region: &mount.region,
        })?;
        self.send(Method::POST, &config_path, Some(config), false).await
    }

    async fn unmount_engine(&self, path: &str) -> Result<()> {
        let request_path = mount_path(VaultOperation::UnmountEngine, path)?;
        info!("Unmounting secrets engine at {}", path);
        self.send(Method::DELETE, &request_path, None, true).await
    }

    async fn list_role_names(&self, path: &str) -> Result<Vec<String>> {
        let request_path = mount_path(VaultOperation::ListRoles, path)?;
        let response = self
            .make_request(Method::GET, &request_path, None)?
            .query(&[("list", "true")])
            .send()
            .await
            .context("Failed to list roles")?;

        match response.status() {
            status if status.is_success() => {
                let body: SecretResponse<ListData> = response
                    .json()
                    .await
                    .context("Failed to parse role list response")?;
                Ok(body.data.keys)
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(Self::handle_error_response(status, &error_text))
            }
        }
    }
}

#[async_trait]
impl RoleClient for VaultRoleClient {
    async fn write(&self, id: &RoleId, role: &ValidatedRole) -> Result<RemoteRoleState> {
        let span = info_span!(
            "vault.role.write",
            role.id = %id,
            credential_type = role.spec().credential_type().as_str(),
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(VaultOperation::WriteRole, span.clone());

        async move { tracker.finish(self.write_role(id, role).await) }
            .instrument(span)
            .await
    }

    async fn read(&self, id: &RoleId) -> Result<Option<RemoteRoleState>> {
        let span = info_span!(
            "vault.role.read",
            role.id = %id,
            operation.found = Empty,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let span_clone = span.clone();
        let tracker = OperationTracker::new(VaultOperation::ReadRole, span.clone());

        async move {
            let result = self.read_role(id).await;
            if let Ok(found) = &result {
                span_clone.record("operation.found", found.is_some());
            }
            tracker.finish(result)
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, id: &RoleId) -> Result<()> {
        let span = info_span!(
            "vault.role.delete",
            role.id = %id,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(VaultOperation::DeleteRole, span.clone());

        async move { tracker.finish(self.delete_role(id).await) }
            .instrument(span)
            .await
    }
}

#[async_trait]
impl MountClient for VaultRoleClient {
    async fn mount(&self, mount: &BackendMount) -> Result<()> {
        let span = info_span!(
            "vault.mount.enable",
            mount.path = %mount.path,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(VaultOperation::MountEngine, span.clone());

        async move { tracker.finish(self.mount_engine(mount).await) }
            .instrument(span)
            .await
    }

    async fn unmount(&self, path: &str) -> Result<()> {
        let span = info_span!(
            "vault.mount.disable",
            mount.path = path,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(VaultOperation::UnmountEngine, span.clone());

        async move { tracker.finish(self.unmount_engine(path).await) }
            .instrument(span)
            .await
    }

    async fn list_roles(&self, path: &str) -> Result<Vec<String>> {
        let span = info_span!(
            "vault.role.list",
            mount.path = path,
            operation.success = Empty,
            operation.duration_ms = Empty,
            error.message = Empty,
        );
        let tracker = OperationTracker::new(VaultOperation::ListRoles, span.clone());

        async move { tracker.finish(self.list_role_names(path).await) }
            .instrument(span)
            .await
    }
}
