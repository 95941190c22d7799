//! Built-in acceptance scenarios for `vault_aws_secret_backend_role`
//!
//! Three resources share one freshly mounted backend:
//!
//! | Local name | Role name | Credential type |
//! |---|---|---|
//! | `test_policy_inline` | `<name>-policy-inline` | `iam_user` with an inline policy |
//! | `test_policy_arns` | `<name>-policy-arn` | `iam_user` with a managed policy ARN |
//! | `test_role_arns` | `<name>-role-arns` | `assumed_role` |
//!
//! Role names and backend paths get a random suffix so scenarios can run
//! side by side against the same Vault.

use super::checks::{attr, attr_absent, attr_json, Check};
use super::scenario::Scenario;
use crate::config::AcceptanceConfig;
use crate::provider::BackendMount;
use crate::resource::{CredentialType, RoleConfig};
use uuid::Uuid;

pub const POLICY_INLINE_BASIC: &str = r#"{"Version": "2012-10-17","Statement": [{"Effect": "Allow","Action": "iam:*","Resource": "*"}]}"#;
pub const POLICY_INLINE_UPDATED: &str = r#"{"Version": "2012-10-17","Statement": [{"Effect": "Allow","Action": "ec2:*","Resource": "*"}]}"#;
pub const POLICY_ARN_BASIC: &str = "arn:aws:iam::123456789123:policy/foo";
pub const POLICY_ARN_UPDATED: &str = "arn:aws:iam::123456789123:policy/bar";
pub const ROLE_ARN_BASIC: &str = "arn:aws:iam::123456789123:role/foo";
pub const ROLE_ARN_UPDATED: &str = "arn:aws:iam::123456789123:role/foo";

pub const POLICY_INLINE: &str = "test_policy_inline";
pub const POLICY_ARNS: &str = "test_policy_arns";
pub const ROLE_ARNS: &str = "test_role_arns";

pub const SCENARIO_BASIC: &str = "basic";
pub const SCENARIO_IMPORT: &str = "import";
pub const SCENARIO_NESTED: &str = "nested";

/// `<prefix>-<random>`
#[must_use]
pub fn random_with_prefix(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &suffix[..12])
}

/// Role name stem and backend path for one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureNames {
    pub name: String,
    pub backend: String,
}

impl FixtureNames {
    #[must_use]
    pub fn random(prefix: &str) -> Self {
        Self {
            name: random_with_prefix(prefix),
            backend: random_with_prefix(prefix),
        }
    }

    /// Same as [`FixtureNames::random`] but with the backend mounted below `<prefix>/nested`
    #[must_use]
    pub fn random_nested(prefix: &str) -> Self {
        Self {
            name: random_with_prefix(prefix),
            backend: random_with_prefix(&format!("{prefix}/nested")),
        }
    }
}

struct Literals {
    policy: &'static str,
    policy_arn: &'static str,
    role_arn: &'static str,
}

const BASIC: Literals = Literals {
    policy: POLICY_INLINE_BASIC,
    policy_arn: POLICY_ARN_BASIC,
    role_arn: ROLE_ARN_BASIC,
};

const UPDATED: Literals = Literals {
    policy: POLICY_INLINE_UPDATED,
    policy_arn: POLICY_ARN_UPDATED,
    role_arn: ROLE_ARN_UPDATED,
};

fn resources(names: &FixtureNames, literals: &Literals) -> Vec<(String, RoleConfig)> {
    let iam_user = CredentialType::IamUser.as_str();
    vec![
        (
            POLICY_INLINE.to_string(),
            RoleConfig::new(format!("{}-policy-inline", names.name), &names.backend, iam_user)
                .with_policy_document(literals.policy),
        ),
        (
            POLICY_ARNS.to_string(),
            RoleConfig::new(format!("{}-policy-arn", names.name), &names.backend, iam_user)
                .with_policy_arns([literals.policy_arn]),
        ),
        (
            ROLE_ARNS.to_string(),
            RoleConfig::new(
                format!("{}-role-arns", names.name),
                &names.backend,
                CredentialType::AssumedRole.as_str(),
            )
            .with_role_arns([literals.role_arn]),
        ),
    ]
}

fn checks(names: &FixtureNames, literals: &Literals) -> Vec<Check> {
    vec![
        attr(POLICY_INLINE, "name", format!("{}-policy-inline", names.name)),
        attr(POLICY_INLINE, "backend", &names.backend),
        attr(POLICY_INLINE, "credential_type", CredentialType::IamUser.as_str()),
        attr_json(POLICY_INLINE, "policy_document", literals.policy),
        attr(POLICY_ARNS, "name", format!("{}-policy-arn", names.name)),
        attr(POLICY_ARNS, "backend", &names.backend),
        attr(POLICY_ARNS, "policy_arns.0", literals.policy_arn),
        attr(ROLE_ARNS, "role_arns.0", literals.role_arn),
        attr(ROLE_ARNS, "credential_type", CredentialType::AssumedRole.as_str()),
        attr_absent(ROLE_ARNS, "policy_document"),
        attr(ROLE_ARNS, "policy_arns.#", "0"),
    ]
}

#[must_use]
pub fn basic_resources(names: &FixtureNames) -> Vec<(String, RoleConfig)> {
    resources(names, &BASIC)
}

#[must_use]
pub fn updated_resources(names: &FixtureNames) -> Vec<(String, RoleConfig)> {
    resources(names, &UPDATED)
}

#[must_use]
pub fn basic_checks(names: &FixtureNames) -> Vec<Check> {
    checks(names, &BASIC)
}

#[must_use]
pub fn updated_checks(names: &FixtureNames) -> Vec<Check> {
    checks(names, &UPDATED)
}

fn backend_mount(names: &FixtureNames, config: &AcceptanceConfig) -> BackendMount {
    BackendMount::new(
        &names.backend,
        &config.aws_access_key_id,
        config.aws_secret_access_key.as_str(),
        &config.aws_region,
    )
}

/// Apply the basic configuration, then update it in place
#[must_use]
pub fn basic_scenario(names: &FixtureNames, config: &AcceptanceConfig) -> Scenario {
    Scenario::new(SCENARIO_BASIC)
        .with_mount(backend_mount(names, config))
        .apply(basic_resources(names), basic_checks(names))
        .apply(updated_resources(names), updated_checks(names))
}

/// Apply the basic configuration, then import each resource by identifier
#[must_use]
pub fn import_scenario(names: &FixtureNames, config: &AcceptanceConfig) -> Scenario {
    Scenario::new(SCENARIO_IMPORT)
        .with_mount(backend_mount(names, config))
        .apply(basic_resources(names), basic_checks(names))
        .import(POLICY_INLINE)
        .import(POLICY_ARNS)
        .import(ROLE_ARNS)
}

/// The basic scenario against a backend mounted at a nested path
#[must_use]
pub fn nested_scenario(names: &FixtureNames, config: &AcceptanceConfig) -> Scenario {
    Scenario {
        name: SCENARIO_NESTED.to_string(),
        ..basic_scenario(names, config)
    }
}

/// Every built-in scenario, each with its own random names
#[must_use]
pub fn all_scenarios(config: &AcceptanceConfig) -> Vec<Scenario> {
    let prefix = config.name_prefix.as_str();
    vec![
        basic_scenario(&FixtureNames::random(prefix), config),
        import_scenario(&FixtureNames::random(prefix), config),
        nested_scenario(&FixtureNames::random_nested(prefix), config),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::scenario::Step;
    use crate::reconciler::resolve;

    #[test]
    fn test_random_names_are_unique() {
        let first = random_with_prefix("tf-test-aws");
        let second = random_with_prefix("tf-test-aws");
        assert!(first.starts_with("tf-test-aws-"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_nested_backend_prefix() {
        let names = FixtureNames::random_nested("tf-test-aws");
        assert!(names.backend.starts_with("tf-test-aws/nested-"));
        assert!(!names.name.contains('/'));
    }

    #[test]
    fn test_fixture_configs_resolve() {
        let names = FixtureNames::random("tf-test-aws");
        for (_, config) in basic_resources(&names)
            .into_iter()
            .chain(updated_resources(&names))
        {
            resolve(&config).unwrap();
        }
    }

    #[test]
    fn test_update_keeps_names() {
        let names = FixtureNames::random("tf-test-aws");
        let basic = basic_resources(&names);
        let updated = updated_resources(&names);
        for ((basic_local, basic), (updated_local, updated)) in basic.iter().zip(&updated) {
            assert_eq!(basic_local, updated_local);
            assert_eq!(basic.name, updated.name);
            assert_eq!(basic.backend, updated.backend);
        }
    }

    #[test]
    fn test_assumed_role_checks_exclude_policies() {
        let names = FixtureNames::random("tf-test-aws");
        let checks = basic_checks(&names);
        assert!(checks.contains(&attr_absent(ROLE_ARNS, "policy_document")));
        assert!(checks.contains(&attr(ROLE_ARNS, "policy_arns.#", "0")));
        assert!(checks.contains(&attr(POLICY_INLINE, "credential_type", "iam_user")));
    }

    #[test]
    fn test_import_scenario_shape() {
        let scenario = import_scenario(
            &FixtureNames::random("tf-test-aws"),
            &AcceptanceConfig::default(),
        );
        assert_eq!(scenario.name, SCENARIO_IMPORT);
        assert!(scenario.mount.is_some());
        let kinds: Vec<_> = scenario.steps.iter().map(Step::kind).collect();
        assert_eq!(kinds, ["apply", "import", "import", "import"]);
    }

    #[test]
    fn test_all_scenarios() {
        let scenarios = all_scenarios(&AcceptanceConfig::default());
        let names: Vec<_> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, [SCENARIO_BASIC, SCENARIO_IMPORT, SCENARIO_NESTED]);
    }
}
