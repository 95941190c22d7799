//! # Constants
//!
//! Shared constants used throughout the crate.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

/// Default Vault address (local dev server)
pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";

/// Default per-request timeout for Vault calls (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default AWS region written to the engine's root config
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Prefix for generated backend paths and role names in acceptance runs
pub const DEFAULT_NAME_PREFIX: &str = "tf-test-aws";

/// Maximum number of acceptance scenarios running at once
pub const DEFAULT_MAX_CONCURRENT_SCENARIOS: usize = 4;

/// Default log level when `RUST_LOG` is not set
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Vault token header
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Vault Enterprise namespace header
pub const VAULT_NAMESPACE_HEADER: &str = "X-Vault-Namespace";

/// Secrets engine type mounted for roles
pub const AWS_ENGINE_TYPE: &str = "aws";
