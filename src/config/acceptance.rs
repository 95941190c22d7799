//! # Acceptance Configuration
//!
//! Settings for acceptance runs against a Vault server. Runs are opt-in via
//! `VAULT_ACC`; the AWS root credentials are written to each mounted engine.

use super::{
    env_var_or_default, env_var_or_default_bool, env_var_or_default_str, process_env,
};
use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_LOG_LEVEL, DEFAULT_MAX_CONCURRENT_SCENARIOS, DEFAULT_NAME_PREFIX,
};
use zeroize::Zeroizing;

#[derive(Clone)]
pub struct AcceptanceConfig {
    /// Acceptance runs are enabled (`VAULT_ACC`)
    pub enabled: bool,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: Zeroizing<String>,
    pub aws_region: String,
    /// Prefix for generated backend paths and role names
    pub name_prefix: String,
    /// Upper bound on scenarios running concurrently
    pub max_concurrent_scenarios: usize,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
}

impl std::fmt::Debug for AcceptanceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceptanceConfig")
            .field("enabled", &self.enabled)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_region", &self.aws_region)
            .field("name_prefix", &self.name_prefix)
            .field("max_concurrent_scenarios", &self.max_concurrent_scenarios)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            aws_access_key_id: String::new(),
            aws_secret_access_key: Zeroizing::new(String::new()),
            aws_region: DEFAULT_AWS_REGION.to_string(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            max_concurrent_scenarios: DEFAULT_MAX_CONCURRENT_SCENARIOS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AcceptanceConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            enabled: env_var_or_default_bool(lookup, "VAULT_ACC", false),
            aws_access_key_id: env_var_or_default_str(lookup, "AWS_ACCESS_KEY_ID", ""),
            aws_secret_access_key: Zeroizing::new(env_var_or_default_str(
                lookup,
                "AWS_SECRET_ACCESS_KEY",
                "",
            )),
            aws_region: env_var_or_default_str(lookup, "AWS_DEFAULT_REGION", DEFAULT_AWS_REGION),
            name_prefix: env_var_or_default_str(lookup, "ACC_NAME_PREFIX", DEFAULT_NAME_PREFIX),
            max_concurrent_scenarios: env_var_or_default(
                lookup,
                "ACC_MAX_CONCURRENT_SCENARIOS",
                DEFAULT_MAX_CONCURRENT_SCENARIOS,
            )
            .max(1),
            log_level: env_var_or_default_str(lookup, "LOG_LEVEL", DEFAULT_LOG_LEVEL),
        }
    }

    /// Both AWS root credentials are present
    #[must_use]
    pub fn has_aws_credentials(&self) -> bool {
        !self.aws_access_key_id.is_empty() && !self.aws_secret_access_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_defaults() {
        let config = AcceptanceConfig::from_lookup(&lookup_from(&[]));
        assert!(!config.enabled);
        assert!(!config.has_aws_credentials());
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.name_prefix, "tf-test-aws");
        assert_eq!(config.max_concurrent_scenarios, 4);
        assert_eq!(config.log_level, "INFO");
    }

    #[test]
    fn test_environment_overrides() {
        let config = AcceptanceConfig::from_lookup(&lookup_from(&[
            ("VAULT_ACC", "1"),
            ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI"),
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("ACC_MAX_CONCURRENT_SCENARIOS", "0"),
        ]));
        assert!(config.enabled);
        assert!(config.has_aws_credentials());
        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.max_concurrent_scenarios, 1);
        assert!(!format!("{config:?}").contains("wJalrXUtnFEMI"));
    }
}
