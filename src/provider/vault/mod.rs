//! Vault REST Client
//!
//! HTTP implementation of [`RoleClient`](crate::provider::RoleClient) and
//! [`MountClient`](crate::provider::MountClient) for the AWS secrets engine.
//! Uses reqwest with rustls (no OpenSSL dependencies).
//!
//! Requests authenticate with `X-Vault-Token` and, for Vault Enterprise,
//! carry `X-Vault-Namespace`. Error bodies (`{"errors": [...]}`) are
//! surfaced as-is together with the HTTP status.
//!
//! References:
//! - [AWS secrets engine API](https://developer.hashicorp.com/vault/api-docs/secret/aws)
//! - [sys/mounts API](https://developer.hashicorp.com/vault/api-docs/system/mounts)

mod common;
mod operations;
mod requests;
mod responses;

// Re-export types
pub use requests::*;
pub use responses::*;

use crate::config::VaultClientConfig;
use crate::constants::{VAULT_NAMESPACE_HEADER, VAULT_TOKEN_HEADER};
use anyhow::{Context, Result};
use reqwest::{Client, Method, Url};
use tracing::info;
use vault_paths::API_PREFIX;
use zeroize::Zeroizing;

/// Vault client for AWS secrets engine roles and mounts
pub struct VaultRoleClient {
    http_client: Client,
    base_url: String,
    token: Zeroizing<String>,
    namespace: Option<String>,
}

impl std::fmt::Debug for VaultRoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultRoleClient")
            .field("base_url", &self.base_url)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultRoleClient {
    /// Create a client for the Vault server described by `config`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &VaultClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = config.address.trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("Invalid Vault address: {base_url}"))?;
        info!("Initializing Vault client for {}", base_url);
        if let Some(namespace) = &config.namespace {
            info!("Using Vault namespace: {}", namespace);
        }

        Ok(Self {
            http_client,
            base_url,
            token: config.token.clone(),
            namespace: config.namespace.clone(),
        })
    }

    /// Create a client from `VAULT_*` environment variables
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built
    pub fn from_env() -> Result<Self> {
        Self::new(&VaultClientConfig::from_env()?)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path` (relative to `/v1/`), percent-encoding each segment
    fn api_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Vault address: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Vault address cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(
                API_PREFIX
                    .split('/')
                    .chain(path.split('/'))
                    .filter(|segment| !segment.is_empty()),
            );
        Ok(url)
    }

    /// Build HTTP request with authentication headers
    pub(crate) fn make_request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.api_url(path)?;

        let mut request = self
            .http_client
            .request(method, url)
            .header(VAULT_TOKEN_HEADER, self.token.as_str());

        if let Some(namespace) = &self.namespace {
            request = request.header(VAULT_NAMESPACE_HEADER, namespace);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        Ok(request)
    }

    /// Turn a non-success response into an error carrying Vault's own messages
    pub(crate) fn handle_error_response(
        status: reqwest::StatusCode,
        error_text: &str,
    ) -> anyhow::Error {
        match serde_json::from_str::<VaultErrorResponse>(error_text) {
            Ok(error_response) if !error_response.errors.is_empty() => anyhow::anyhow!(
                "Vault API error (HTTP {}): {}",
                status.as_u16(),
                error_response.errors.join("; ")
            ),
            // Include status code in error message for easier matching in tests
            _ => anyhow::anyhow!(
                "HTTP {} (status: {}): {}",
                status.as_u16(),
                status,
                error_text
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_response_keeps_vault_messages() {
        let err = VaultRoleClient::handle_error_response(
            StatusCode::FORBIDDEN,
            r#"{"errors":["permission denied"]}"#,
        );
        assert_eq!(err.to_string(), "Vault API error (HTTP 403): permission denied");
    }

    #[test]
    fn test_error_response_without_json_body() {
        let err = VaultRoleClient::handle_error_response(StatusCode::BAD_GATEWAY, "upstream down");
        let message = err.to_string();
        assert!(message.contains("HTTP 502"));
        assert!(message.contains("upstream down"));
    }

    #[test]
    fn test_api_url_encodes_segments() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client =
            VaultRoleClient::new(&VaultClientConfig::new("http://127.0.0.1:8200/", "root")).unwrap();
        assert_eq!(
            client.api_url("team/aws/roles/deploy").unwrap().as_str(),
            "http://127.0.0.1:8200/v1/team/aws/roles/deploy"
        );
        assert_eq!(
            client.api_url("aws/roles/victim?x#y").unwrap().as_str(),
            "http://127.0.0.1:8200/v1/aws/roles/victim%3Fx%23y"
        );
    }

    #[test]
    fn test_api_url_keeps_address_path() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client =
            VaultRoleClient::new(&VaultClientConfig::new("https://proxy.local/vault/", "root"))
                .unwrap();
        assert_eq!(
            client.api_url("sys/mounts/aws").unwrap().as_str(),
            "https://proxy.local/vault/v1/sys/mounts/aws"
        );
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        assert!(VaultRoleClient::new(&VaultClientConfig::new("not a url", "root")).is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client =
            VaultRoleClient::new(&VaultClientConfig::new("http://127.0.0.1:8200/", "s.secret"))
                .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8200");
        assert!(!format!("{client:?}").contains("s.secret"));
    }
}
