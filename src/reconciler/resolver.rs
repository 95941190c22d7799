//! # Credential-Mode Resolver
//!
//! Turns the flat, sparsely populated [`RoleConfig`] into a [`ValidatedRole`]
//! whose [`CredentialSpec`] can only express legal field combinations.
//!
//! Rules are checked in order and the first violation wins:
//! 1. `name` and `backend` are present, and `name` is a valid Vault role name
//!    (word characters, with `.` and `-` allowed in the middle)
//! 2. `credential_type` is a known value
//! 3. `iam_user` / `federation_token`: no `role_arns`
//! 4. `assumed_role`: no `policy_document` or `policy_arns`, at least one `role_arns` entry
//! 5. a present `policy_document` parses as JSON
//!
//! Resolution is pure: no I/O, no logging.

use crate::resource::{
    CredentialType, MalformedRoleId, PolicyDocument, RoleConfig, UnknownCredentialType,
};
use regex::Regex;
use thiserror::Error;
use vault_paths::normalize_mount;

/// Names Vault accepts in `<mount>/roles/<name>` routes
const ROLE_NAME_PATTERN: &str = r"^[A-Za-z0-9_]([A-Za-z0-9_.-]*[A-Za-z0-9_])?$";

/// Reasons a role configuration is rejected before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{0}` is required and must not be empty")]
    MissingField(&'static str),

    #[error(
        "role name {0:?} may only contain letters, digits, '_', '.' and '-', and must start and end with a letter, digit or '_'"
    )]
    InvalidName(String),

    #[error("credential_type {0:?} is not one of iam_user, assumed_role, federation_token")]
    UnknownCredentialType(String),

    #[error("`{field}` is not allowed with credential_type {credential_type}")]
    FieldNotAllowed {
        field: &'static str,
        credential_type: CredentialType,
    },

    #[error("credential_type assumed_role requires at least one entry in `role_arns`")]
    MissingRoleArns,

    #[error("policy_document is not valid JSON: {0}")]
    MalformedPolicy(String),

    #[error(transparent)]
    MalformedId(#[from] MalformedRoleId),
}

/// Credential types that carry IAM policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCredentialType {
    IamUser,
    FederationToken,
}

impl From<PolicyCredentialType> for CredentialType {
    fn from(value: PolicyCredentialType) -> Self {
        match value {
            PolicyCredentialType::IamUser => CredentialType::IamUser,
            PolicyCredentialType::FederationToken => CredentialType::FederationToken,
        }
    }
}

/// The credential strategy of a validated role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSpec {
    /// `iam_user` or `federation_token`: inline policy and/or managed policy ARNs.
    /// Both may be empty (a role without permissions).
    Policies {
        credential_type: PolicyCredentialType,
        document: Option<PolicyDocument>,
        policy_arns: Vec<String>,
    },
    /// `assumed_role`: a non-empty list of assumable role ARNs
    RoleArns(Vec<String>),
}

impl CredentialSpec {
    #[must_use]
    pub fn credential_type(&self) -> CredentialType {
        match self {
            Self::Policies {
                credential_type, ..
            } => (*credential_type).into(),
            Self::RoleArns(_) => CredentialType::AssumedRole,
        }
    }

    #[must_use]
    pub fn policy_document(&self) -> Option<&PolicyDocument> {
        match self {
            Self::Policies { document, .. } => document.as_ref(),
            Self::RoleArns(_) => None,
        }
    }

    #[must_use]
    pub fn policy_arns(&self) -> &[String] {
        match self {
            Self::Policies { policy_arns, .. } => policy_arns,
            Self::RoleArns(_) => &[],
        }
    }

    #[must_use]
    pub fn role_arns(&self) -> &[String] {
        match self {
            Self::Policies { .. } => &[],
            Self::RoleArns(arns) => arns,
        }
    }
}

/// A role configuration that passed every resolver rule
///
/// Only [`resolve`] constructs this type, so holding one proves the field
/// combination is legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRole {
    name: String,
    backend: String,
    spec: CredentialSpec,
}

impl ValidatedRole {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized mount path
    #[must_use]
    pub fn backend(&self) -> &str {
        &self.backend
    }

    #[must_use]
    pub fn spec(&self) -> &CredentialSpec {
        &self.spec
    }
}

fn is_valid_role_name(name: &str) -> bool {
    Regex::new(ROLE_NAME_PATTERN).is_ok_and(|re| re.is_match(name))
}

/// Validate `config` and build its tagged credential spec
pub fn resolve(config: &RoleConfig) -> Result<ValidatedRole, ValidationError> {
    let name = config.name.as_str();
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if !is_valid_role_name(name) {
        return Err(ValidationError::InvalidName(config.name.clone()));
    }
    let backend = normalize_mount(&config.backend);
    if backend.is_empty() {
        return Err(ValidationError::MissingField("backend"));
    }

    let credential_type: CredentialType = config
        .credential_type
        .parse()
        .map_err(|e: UnknownCredentialType| ValidationError::UnknownCredentialType(e.0))?;

    let document_text = config.policy_document();

    let spec = match credential_type {
        CredentialType::IamUser | CredentialType::FederationToken => {
            if !config.role_arns.is_empty() {
                return Err(ValidationError::FieldNotAllowed {
                    field: "role_arns",
                    credential_type,
                });
            }
            let document = document_text
                .map(PolicyDocument::parse)
                .transpose()
                .map_err(|e| ValidationError::MalformedPolicy(e.to_string()))?;
            CredentialSpec::Policies {
                credential_type: if credential_type == CredentialType::IamUser {
                    PolicyCredentialType::IamUser
                } else {
                    PolicyCredentialType::FederationToken
                },
                document,
                policy_arns: config.policy_arns.clone(),
            }
        }
        CredentialType::AssumedRole => {
            if document_text.is_some() {
                return Err(ValidationError::FieldNotAllowed {
                    field: "policy_document",
                    credential_type,
                });
            }
            if !config.policy_arns.is_empty() {
                return Err(ValidationError::FieldNotAllowed {
                    field: "policy_arns",
                    credential_type,
                });
            }
            if config.role_arns.is_empty() {
                return Err(ValidationError::MissingRoleArns);
            }
            CredentialSpec::RoleArns(config.role_arns.clone())
        }
    };

    Ok(ValidatedRole {
        name: name.to_string(),
        backend: backend.to_string(),
        spec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"{"Version": "2012-10-17","Statement": [{"Effect": "Allow","Action": "iam:*","Resource": "*"}]}"#;
    const ROLE_ARN: &str = "arn:aws:iam::123456789123:role/foo";
    const POLICY_ARN: &str = "arn:aws:iam::123456789123:policy/foo";

    #[test]
    fn test_inline_policy_role() {
        let role = resolve(&RoleConfig::new("inline", "/aws/", "iam_user").with_policy_document(POLICY))
            .unwrap();
        assert_eq!(role.backend(), "aws");
        assert_eq!(role.spec().credential_type(), CredentialType::IamUser);
        assert!(role.spec().policy_document().unwrap().matches_text(POLICY));
        assert!(role.spec().role_arns().is_empty());
    }

    #[test]
    fn test_iam_user_without_policies_is_legal() {
        let role = resolve(&RoleConfig::new("empty", "aws", "iam_user")).unwrap();
        assert_eq!(
            role.spec(),
            &CredentialSpec::Policies {
                credential_type: PolicyCredentialType::IamUser,
                document: None,
                policy_arns: Vec::new(),
            }
        );
    }

    #[test]
    fn test_federation_token_takes_both_policy_kinds() {
        let role = resolve(
            &RoleConfig::new("fed", "aws", "federation_token")
                .with_policy_document(POLICY)
                .with_policy_arns([POLICY_ARN]),
        )
        .unwrap();
        assert_eq!(role.spec().credential_type(), CredentialType::FederationToken);
        assert_eq!(role.spec().policy_arns(), [POLICY_ARN.to_string()]);
    }

    #[test]
    fn test_assumed_role() {
        let role =
            resolve(&RoleConfig::new("assumer", "aws", "assumed_role").with_role_arns([ROLE_ARN]))
                .unwrap();
        assert_eq!(role.spec(), &CredentialSpec::RoleArns(vec![ROLE_ARN.to_string()]));
        assert!(role.spec().policy_document().is_none());
        assert!(role.spec().policy_arns().is_empty());
    }

    #[test]
    fn test_unknown_credential_type() {
        assert_eq!(
            resolve(&RoleConfig::new("r", "aws", "root")),
            Err(ValidationError::UnknownCredentialType("root".to_string()))
        );
    }

    #[test]
    fn test_role_arns_rejected_for_policy_types() {
        for t in ["iam_user", "federation_token"] {
            let err = resolve(&RoleConfig::new("r", "aws", t).with_role_arns([ROLE_ARN])).unwrap_err();
            assert!(matches!(
                err,
                ValidationError::FieldNotAllowed { field: "role_arns", .. }
            ));
        }
    }

    #[test]
    fn test_policies_rejected_for_assumed_role() {
        let err = resolve(
            &RoleConfig::new("r", "aws", "assumed_role")
                .with_role_arns([ROLE_ARN])
                .with_policy_document(POLICY),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldNotAllowed {
                field: "policy_document",
                credential_type: CredentialType::AssumedRole
            }
        );

        let err = resolve(
            &RoleConfig::new("r", "aws", "assumed_role")
                .with_role_arns([ROLE_ARN])
                .with_policy_arns([POLICY_ARN]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldNotAllowed { field: "policy_arns", .. }
        ));
    }

    #[test]
    fn test_assumed_role_requires_role_arns() {
        assert_eq!(
            resolve(&RoleConfig::new("r", "aws", "assumed_role")),
            Err(ValidationError::MissingRoleArns)
        );
    }

    #[test]
    fn test_blank_policy_is_ignored_for_assumed_role() {
        let config = RoleConfig::new("r", "aws", "assumed_role")
            .with_role_arns([ROLE_ARN])
            .with_policy_document("");
        assert!(resolve(&config).is_ok());
    }

    #[test]
    fn test_malformed_policy() {
        let err = resolve(&RoleConfig::new("r", "aws", "iam_user").with_policy_document("{not json"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::MalformedPolicy(_)));
    }

    #[test]
    fn test_field_legality_wins_over_json_parsing() {
        let err = resolve(
            &RoleConfig::new("r", "aws", "assumed_role")
                .with_role_arns([ROLE_ARN])
                .with_policy_document("{not json"),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::FieldNotAllowed { .. }));
    }

    #[test]
    fn test_name_and_backend_checks_come_first() {
        assert_eq!(
            resolve(&RoleConfig::new("", "aws", "bogus")),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            resolve(&RoleConfig::new("r", "//", "iam_user")),
            Err(ValidationError::MissingField("backend"))
        );
        assert_eq!(
            resolve(&RoleConfig::new("a/b", "aws", "iam_user")),
            Err(ValidationError::InvalidName("a/b".to_string()))
        );
    }

    #[test]
    fn test_role_name_rule() {
        for name in ["r", "deploy", "tf-test-aws-0a1b-policy-inline", "a.b", "a_b", "_x", "9"] {
            assert!(
                resolve(&RoleConfig::new(name, "aws", "iam_user")).is_ok(),
                "{name:?} should be accepted"
            );
        }
        for name in ["victim?x", "victim#x", "..", ".r", "r-", "a b", " r", "r%2F", "ä"] {
            assert_eq!(
                resolve(&RoleConfig::new(name, "aws", "iam_user")),
                Err(ValidationError::InvalidName(name.to_string())),
                "{name:?} should be rejected"
            );
        }
    }
}
