//! Mock Vault server
//!
//! A lightweight Axum-based HTTP server that mimics the slice of the Vault API
//! used by the role client:
//! - `sys/mounts` (enable / disable secrets engines)
//! - `<mount>/config/root` of the AWS secrets engine
//! - `<mount>/roles/<name>` CRUD and listing
//!
//! Requests must carry `X-Vault-Token` matching the configured root token.
//! Sending `X-Service-Unavailable: true` returns `503` so clients can test
//! error handling without touching server state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn run() -> anyhow::Result<()> {
//! use vault_mock_server::{spawn, AppState};
//!
//! let server = spawn(AppState::new("root")).await?;
//! println!("mock Vault at {}", server.url());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod handlers;
pub mod store;

pub use errors::VaultError;
pub use store::{RootConfig, StoredRole, VaultStore};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Header carrying the client token
pub const TOKEN_HEADER: &str = "x-vault-token";

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: VaultStore,
    root_token: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(root_token: &str) -> Self {
        Self {
            store: VaultStore::new(),
            root_token: Arc::from(root_token),
        }
    }
}

fn is_health_path(path: &str) -> bool {
    matches!(path, "/" | "/health" | "/v1/sys/health")
}

/// Request logging middleware
/// Logs method, path, response status, and duration
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    info!("→ {} {}", method, path);
    let response = next.run(request).await;
    info!(
        "← {} {} [{}] [{:.3}s]",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64()
    );

    response
}

/// Token middleware
/// Returns 403 `permission denied` unless `X-Vault-Token` matches the root token
pub async fn token_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| token == &*state.root_token);
    if !authorized {
        warn!("Rejecting request without a valid token: {}", request.uri().path());
        return VaultError::permission_denied().into_response();
    }

    next.run(request).await
}

/// Service unavailable middleware
/// Returns 503 Service Unavailable if request includes X-Service-Unavailable header
pub async fn service_unavailable_middleware(request: Request, next: Next) -> Response {
    if is_health_path(request.uri().path()) {
        return next.run(request).await;
    }

    let unavailable = request
        .headers()
        .get("x-service-unavailable")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    if unavailable {
        warn!("Service unavailable header detected - returning 503");
        return VaultError::new(StatusCode::SERVICE_UNAVAILABLE, "Vault is sealed").into_response();
    }

    next.run(request).await
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "initialized": true,
        "sealed": false,
        "standby": false,
        "service": "vault-mock-server"
    }))
}

/// Build the router with all endpoints and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/v1/sys/health", get(health_check))
        .route("/v1/{*path}", any(handlers::handle_vault_request))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(axum::middleware::from_fn(service_unavailable_middleware))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    token_middleware,
                )),
        )
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped
///
/// # Errors
/// Returns an error if the server fails
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// A server running on an ephemeral local port; stopped on drop
#[derive(Debug)]
pub struct RunningServer {
    addr: SocketAddr,
    state: AppState,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:49152`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Direct access to the backing store, bypassing HTTP
    pub fn store(&self) -> &VaultStore {
        &self.state.store
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Bind `127.0.0.1:0` and serve in a background task
///
/// # Errors
/// Returns an error if the listener cannot be bound
pub async fn spawn(state: AppState) -> anyhow::Result<RunningServer> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    let server_state = state.clone();
    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, server_state).await {
            warn!("Mock Vault server stopped: {:#}", e);
        }
    });
    info!("Mock Vault server listening on {}", addr);
    Ok(RunningServer {
        addr,
        state,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;

    const TOKEN: &str = "test-root";

    fn test_server() -> TestServer {
        let mut server = TestServer::new(router(AppState::new(TOKEN))).unwrap();
        server.add_header(
            HeaderName::from_static(TOKEN_HEADER),
            HeaderValue::from_static(TOKEN),
        );
        server
    }

    async fn mount_aws(server: &TestServer, path: &str) {
        server
            .post(&format!("/v1/sys/mounts/{path}"))
            .json(&json!({"type": "aws", "description": "test"}))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let server = TestServer::new(router(AppState::new(TOKEN))).unwrap();
        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["sealed"], false);
    }

    #[tokio::test]
    async fn test_missing_token_is_denied() {
        let server = TestServer::new(router(AppState::new(TOKEN))).unwrap();
        let response = server.get("/v1/aws/roles/r").await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body, json!({"errors": ["permission denied"]}));
    }

    #[tokio::test]
    async fn test_role_lifecycle() {
        let server = test_server();
        mount_aws(&server, "aws").await;

        server
            .post("/v1/aws/roles/deploy")
            .json(&json!({
                "credential_type": "iam_user",
                "policy_document": "{ \"Version\": \"2012-10-17\" }",
                "policy_arns": [],
                "role_arns": []
            }))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server.get("/v1/aws/roles/deploy").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["credential_type"], "iam_user");
        assert_eq!(body["data"]["policy_document"], r#"{"Version":"2012-10-17"}"#);

        server
            .delete("/v1/aws/roles/deploy")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let response = server.get("/v1/aws/roles/deploy").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body, json!({"errors": []}));
    }

    #[tokio::test]
    async fn test_list_roles() {
        let server = test_server();
        mount_aws(&server, "team/aws").await;

        server
            .get("/v1/team/aws/roles")
            .add_query_param("list", "true")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        for name in ["a", "b"] {
            server
                .post(&format!("/v1/team/aws/roles/{name}"))
                .json(&json!({"credential_type": "federation_token"}))
                .await
                .assert_status(StatusCode::NO_CONTENT);
        }

        let response = server
            .get("/v1/team/aws/roles")
            .add_query_param("list", "true")
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["keys"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_unmounted_path_has_no_handler() {
        let server = test_server();
        let response = server.get("/v1/missing/roles/r").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert!(body["errors"][0].as_str().unwrap().contains("no handler for route"));
    }

    #[tokio::test]
    async fn test_root_config_hides_secret_key() {
        let server = test_server();
        mount_aws(&server, "aws").await;
        server
            .post("/v1/aws/config/root")
            .json(&json!({"access_key": "AKIA", "secret_key": "hidden", "region": "eu-west-1"}))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server.get("/v1/aws/config/root").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"], json!({"access_key": "AKIA", "region": "eu-west-1"}));
    }

    #[tokio::test]
    async fn test_service_unavailable_header() {
        let server = test_server();
        let response = server
            .get("/v1/sys/mounts")
            .add_header(
                HeaderName::from_static("x-service-unavailable"),
                HeaderValue::from_static("true"),
            )
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unmount_removes_roles() {
        let server = test_server();
        mount_aws(&server, "aws").await;
        server
            .post("/v1/aws/roles/r")
            .json(&json!({"credential_type": "iam_user"}))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .delete("/v1/sys/mounts/aws")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/v1/aws/roles/r")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
