//! # Flattened Attributes
//!
//! The host addresses resource state through a flat string map. Lists are
//! flattened as `<key>.#` (length) followed by `<key>.<index>` entries.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert `items` as `<key>.#` plus one `<key>.<i>` entry per element
    pub fn insert_list(&mut self, key: &str, items: &[String]) {
        self.insert(format!("{key}.#"), items.len().to_string());
        for (i, item) in items.iter().enumerate() {
            self.insert(format!("{key}.{i}"), item.clone());
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_flattening() {
        let mut attrs = Attributes::new();
        attrs.insert_list(
            "policy_arns",
            &["arn:a".to_string(), "arn:b".to_string()],
        );
        assert_eq!(attrs.get("policy_arns.#"), Some("2"));
        assert_eq!(attrs.get("policy_arns.0"), Some("arn:a"));
        assert_eq!(attrs.get("policy_arns.1"), Some("arn:b"));
        assert_eq!(attrs.get("policy_arns.2"), None);
    }

    #[test]
    fn test_empty_list_records_zero_length() {
        let mut attrs = Attributes::new();
        attrs.insert_list("role_arns", &[]);
        assert_eq!(attrs.get("role_arns.#"), Some("0"));
        assert_eq!(attrs.get("role_arns.0"), None);
    }
}
