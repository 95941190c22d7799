//! # PACT_MODE Endpoint Override
//!
//! When `PACT_MODE` is set the Vault address comes from `VAULT_MOCK_ENDPOINT`
//! instead of `VAULT_ADDR`, and that endpoint must not look like a
//! production Vault.

use anyhow::Result;
use tracing::{info, warn};

pub const PACT_MODE_VAR: &str = "PACT_MODE";
pub const MOCK_ENDPOINT_VAR: &str = "VAULT_MOCK_ENDPOINT";

/// Whether `PACT_MODE` is enabled in the process environment
#[must_use]
pub fn pact_mode_enabled() -> bool {
    super::env_var_or_default_bool(&super::process_env, PACT_MODE_VAR, false)
}

/// Resolve the mock endpoint when pact mode is on
pub(crate) fn mock_endpoint<F>(lookup: &F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    if !super::env_var_or_default_bool(lookup, PACT_MODE_VAR, false) {
        return Ok(None);
    }

    let endpoint = super::env_var_non_empty(lookup, MOCK_ENDPOINT_VAR).ok_or_else(|| {
        anyhow::anyhow!(
            "PACT_MODE enabled but Vault mock endpoint not configured. \
            Set {MOCK_ENDPOINT_VAR} environment variable."
        )
    })?;
    validate_endpoint(&endpoint)?;
    info!("PACT_MODE: Overriding Vault address to {}", endpoint);
    Ok(Some(endpoint))
}

/// Reject endpoints that point at a hosted Vault; warn on anything that
/// does not look like a local mock.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.contains(".hashicorp.cloud") || endpoint.starts_with("https://vault.") {
        return Err(anyhow::anyhow!(
            "PACT_MODE enabled but endpoint '{}' points to a production Vault. \
            This is not allowed in Pact mode. Use a mock server endpoint instead.",
            endpoint
        ));
    }

    let looks_like_mock = endpoint.starts_with("http://localhost")
        || endpoint.starts_with("http://127.0.0.1")
        || endpoint.starts_with("http://[::1]")
        || endpoint.contains("host.docker.internal")
        || endpoint.contains(".svc.cluster.local")
        || endpoint.contains("pact")
        || endpoint.contains("mock");

    if !looks_like_mock {
        warn!(
            "PACT_MODE enabled but endpoint '{}' does not appear to be a mock server. \
            Verify this is correct and not pointing to a production Vault.",
            endpoint
        );
    }

    Ok(())
}
