//! Attribute checks evaluated against a resource's flattened state

use super::error::PostconditionError;
use crate::resource::Attributes;
use serde_json::Value;

/// A single expectation about one resource's attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Attribute equals the value exactly
    Attr {
        resource: String,
        key: String,
        value: String,
    },
    /// Attribute parses as JSON equal to `json`
    AttrJson {
        resource: String,
        key: String,
        json: String,
    },
    /// Attribute is not set
    AttrAbsent { resource: String, key: String },
}

pub fn attr(resource: &str, key: &str, value: impl Into<String>) -> Check {
    Check::Attr {
        resource: resource.to_string(),
        key: key.to_string(),
        value: value.into(),
    }
}

pub fn attr_json(resource: &str, key: &str, json: impl Into<String>) -> Check {
    Check::AttrJson {
        resource: resource.to_string(),
        key: key.to_string(),
        json: json.into(),
    }
}

pub fn attr_absent(resource: &str, key: &str) -> Check {
    Check::AttrAbsent {
        resource: resource.to_string(),
        key: key.to_string(),
    }
}

impl Check {
    /// Local name of the resource this check inspects
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::Attr { resource, .. }
            | Self::AttrJson { resource, .. }
            | Self::AttrAbsent { resource, .. } => resource,
        }
    }

    /// Evaluate against `attrs`, the attributes of [`Check::resource`]
    ///
    /// # Errors
    /// Returns the [`PostconditionError`] describing the mismatch
    pub fn evaluate(&self, attrs: &Attributes) -> Result<(), PostconditionError> {
        match self {
            Self::Attr {
                resource,
                key,
                value,
            } => {
                let actual = attrs.get(key);
                if actual == Some(value.as_str()) {
                    Ok(())
                } else {
                    Err(PostconditionError::AttributeMismatch {
                        resource: resource.clone(),
                        key: key.clone(),
                        expected: value.clone(),
                        actual: actual.map(str::to_string),
                    })
                }
            }
            Self::AttrJson {
                resource,
                key,
                json,
            } => {
                let mismatch = |actual: Option<&str>| PostconditionError::AttributeMismatch {
                    resource: resource.clone(),
                    key: key.clone(),
                    expected: json.clone(),
                    actual: actual.map(str::to_string),
                };
                let Some(actual) = attrs.get(key) else {
                    return Err(mismatch(None));
                };
                let actual_value: Value = serde_json::from_str(actual).map_err(|_| {
                    PostconditionError::AttributeNotJson {
                        resource: resource.clone(),
                        key: key.clone(),
                        actual: actual.to_string(),
                    }
                })?;
                // An expected value that is not JSON can never match
                match serde_json::from_str::<Value>(json) {
                    Ok(expected) if expected == actual_value => Ok(()),
                    _ => Err(mismatch(Some(actual))),
                }
            }
            Self::AttrAbsent { resource, key } => match attrs.get(key) {
                None => Ok(()),
                Some(actual) => Err(PostconditionError::AttributePresent {
                    resource: resource.clone(),
                    key: key.clone(),
                    actual: actual.to_string(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("name", "deploy");
        attrs.insert("policy_document", r#"{"Version":"2012-10-17"}"#);
        attrs.insert_list("role_arns", &["arn:aws:iam::123456789123:role/foo".to_string()]);
        attrs
    }

    #[test]
    fn test_attr() {
        assert!(attr("r", "name", "deploy").evaluate(&attrs()).is_ok());
        assert!(attr("r", "role_arns.#", "1").evaluate(&attrs()).is_ok());

        let err = attr("r", "name", "other").evaluate(&attrs()).unwrap_err();
        assert_eq!(
            err,
            PostconditionError::AttributeMismatch {
                resource: "r".to_string(),
                key: "name".to_string(),
                expected: "other".to_string(),
                actual: Some("deploy".to_string()),
            }
        );
    }

    #[test]
    fn test_attr_missing_key() {
        let err = attr("r", "policy_arns.0", "x").evaluate(&attrs()).unwrap_err();
        assert!(matches!(err, PostconditionError::AttributeMismatch { actual: None, .. }));
    }

    #[test]
    fn test_attr_json_ignores_formatting() {
        let check = attr_json("r", "policy_document", r#"{ "Version" : "2012-10-17" }"#);
        assert!(check.evaluate(&attrs()).is_ok());

        let check = attr_json("r", "policy_document", r#"{"Version":"2008-10-17"}"#);
        assert!(check.evaluate(&attrs()).is_err());
    }

    #[test]
    fn test_attr_json_on_plain_text() {
        let err = attr_json("r", "name", "{}").evaluate(&attrs()).unwrap_err();
        assert!(matches!(err, PostconditionError::AttributeNotJson { .. }));
    }

    #[test]
    fn test_attr_absent() {
        assert!(attr_absent("r", "policy_arns.0").evaluate(&attrs()).is_ok());
        assert!(attr_absent("r", "name").evaluate(&attrs()).is_err());
    }
}
