//! Request dispatch for `/v1/*`
//!
//! Every API request lands in [`handle_vault_request`] and is routed by path:
//!
//! | Path | Methods |
//! |---|---|
//! | `sys/mounts` | GET |
//! | `sys/mounts/{path}` | POST, DELETE |
//! | `{mount}/config/root` | POST, GET |
//! | `{mount}/roles` | LIST (or GET with `?list=true`) |
//! | `{mount}/roles/{name}` | POST, PUT, GET, DELETE |
//!
//! Mounts may contain slashes; the longest mounted prefix wins.

use crate::errors::VaultError;
use crate::store::RootConfig;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;
use vault_paths::prelude::*;

/// Vault's envelope for successful reads
fn secret_response(data: Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "request_id": uuid::Uuid::new_v4().to_string(),
            "lease_id": "",
            "renewable": false,
            "lease_duration": 0,
            "data": data,
            "wrap_info": null,
            "warnings": null,
            "auth": null
        })),
    )
        .into_response()
}

fn parse_body(body: &Bytes) -> Result<Value, VaultError> {
    if body.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_slice(body)
        .map_err(|e| VaultError::bad_request(format!("failed to parse JSON input: {e}")))
}

fn is_list(method: &Method, query: &HashMap<String, String>) -> bool {
    method.as_str() == "LIST"
        || (method == Method::GET && query.get("list").is_some_and(|v| v == "true"))
}

/// Handler for all `/v1/*` requests
pub async fn handle_vault_request(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    match dispatch(&state, &method, path.trim_matches('/'), &query, &body).await {
        Ok(response) => response,
        Err(e) => {
            info!("  {} {} -> {}", method, path, e);
            e.into_response()
        }
    }
}

async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    query: &HashMap<String, String>,
    body: &Bytes,
) -> Result<Response, VaultError> {
    if path == SYS_MOUNTS {
        return match *method {
            Method::GET => {
                let mounts = state.store.mounts().await;
                Ok(secret_response(json!(mounts)))
            }
            _ => Err(VaultError::unsupported_operation()),
        };
    }
    if let Some(mount) = path.strip_prefix(SYS_MOUNTS).and_then(|p| p.strip_prefix('/')) {
        return handle_mount(state, method, mount, body).await;
    }

    let (mount, rest) = state
        .store
        .resolve_mount(path)
        .await
        .ok_or_else(|| VaultError::no_handler(path))?;

    if rest == "config/root" {
        return handle_root_config(state, method, &mount, body).await;
    }
    if rest == ROLES_SEGMENT && is_list(method, query) {
        let keys = state.store.list_roles(&mount).await;
        if keys.is_empty() {
            return Err(VaultError::not_found());
        }
        return Ok(secret_response(json!({ "keys": keys })));
    }
    if let Some(name) = rest
        .strip_prefix(ROLES_SEGMENT)
        .and_then(|r| r.strip_prefix('/'))
        .filter(|name| !name.is_empty() && !name.contains('/'))
    {
        return handle_role(state, method, &mount, name, body).await;
    }

    Err(VaultError::no_handler(path))
}

async fn handle_mount(
    state: &AppState,
    method: &Method,
    mount: &str,
    body: &Bytes,
) -> Result<Response, VaultError> {
    match *method {
        Method::POST | Method::PUT => {
            let body = parse_body(body)?;
            let engine_type = body.get("type").and_then(Value::as_str).unwrap_or_default();
            let description = body
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            state.store.mount(mount, engine_type, description).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Method::DELETE => {
            state.store.unmount(mount).await;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(VaultError::unsupported_operation()),
    }
}

async fn handle_root_config(
    state: &AppState,
    method: &Method,
    mount: &str,
    body: &Bytes,
) -> Result<Response, VaultError> {
    match *method {
        Method::POST | Method::PUT => {
            let body = parse_body(body)?;
            let field = |key: &str| {
                body.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let root = RootConfig {
                access_key: field("access_key"),
                secret_key: field("secret_key"),
                region: field("region"),
            };
            state.store.configure_root(mount, root).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Method::GET => {
            let root = state
                .store
                .root_config(mount)
                .await
                .ok_or_else(VaultError::not_found)?;
            Ok(secret_response(json!(root)))
        }
        _ => Err(VaultError::unsupported_operation()),
    }
}

async fn handle_role(
    state: &AppState,
    method: &Method,
    mount: &str,
    name: &str,
    body: &Bytes,
) -> Result<Response, VaultError> {
    match *method {
        Method::POST | Method::PUT => {
            let body = parse_body(body)?;
            state.store.write_role(mount, name, &body).await?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Method::GET => {
            let role = state
                .store
                .read_role(mount, name)
                .await
                .ok_or_else(VaultError::not_found)?;
            Ok(secret_response(json!({
                "credential_type": role.credential_type,
                "policy_document": role.policy_document,
                "policy_arns": role.policy_arns,
                "role_arns": role.role_arns,
                "iam_groups": null,
                "iam_tags": null,
                "default_sts_ttl": 0,
                "max_sts_ttl": 0,
                "user_path": "",
                "permissions_boundary_arn": ""
            })))
        }
        Method::DELETE => {
            state.store.delete_role(mount, name).await;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(VaultError::unsupported_operation()),
    }
}
