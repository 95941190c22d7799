//! # Vault Client Configuration
//!
//! Connection settings for [`crate::provider::VaultRoleClient`].

use super::{
    env_var_non_empty, env_var_or_default, env_var_or_default_str, pact_mode, process_env,
};
use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_VAULT_ADDR};
use anyhow::Result;
use std::time::Duration;
use zeroize::Zeroizing;

/// Token used when none is configured; matches the mock server's root token
pub const DEFAULT_DEV_TOKEN: &str = "root";

#[derive(Clone)]
pub struct VaultClientConfig {
    /// Base address, e.g. `http://127.0.0.1:8200`
    pub address: String,
    /// Sent as `X-Vault-Token`
    pub token: Zeroizing<String>,
    /// Sent as `X-Vault-Namespace` when set
    pub namespace: Option<String>,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for VaultClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClientConfig")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for VaultClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_VAULT_ADDR.to_string(),
            token: Zeroizing::new(DEFAULT_DEV_TOKEN.to_string()),
            namespace: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl VaultClientConfig {
    #[must_use]
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: Zeroizing::new(token.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Load configuration from environment variables with defaults
    ///
    /// # Errors
    /// Returns an error if `PACT_MODE` is set without a valid mock endpoint
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = match pact_mode::mock_endpoint(lookup)? {
            Some(endpoint) => endpoint,
            None => env_var_or_default_str(lookup, "VAULT_ADDR", DEFAULT_VAULT_ADDR),
        };

        Ok(Self {
            address: address.trim_end_matches('/').to_string(),
            token: Zeroizing::new(env_var_or_default_str(
                lookup,
                "VAULT_TOKEN",
                DEFAULT_DEV_TOKEN,
            )),
            namespace: env_var_non_empty(lookup, "VAULT_NAMESPACE"),
            request_timeout_secs: env_var_or_default(
                lookup,
                "VAULT_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
        })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
