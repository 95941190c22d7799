//! # Policy Documents
//!
//! Inline IAM policies travel as JSON text. Vault re-serializes the text it
//! stores (key order and whitespace are not preserved), so two documents are
//! the same policy when their parsed JSON values are equal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed inline IAM policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyDocument(Value);

impl PolicyDocument {
    /// Parse policy text, rejecting anything that is not valid JSON
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Compact rendering sent on the wire and exposed as the attribute value
    #[must_use]
    pub fn to_compact_string(&self) -> String {
        self.0.to_string()
    }

    /// Whether `text` parses to the same JSON value as this document
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        Self::parse(text).is_ok_and(|other| other == *self)
    }
}

impl FromStr for PolicyDocument {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PolicyDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JSON-value equality of two policy texts; falls back to byte equality when
/// either side does not parse.
#[must_use]
pub fn policies_equivalent(left: &str, right: &str) -> bool {
    match (PolicyDocument::parse(left), PolicyDocument::parse(right)) {
        (Ok(l), Ok(r)) => l == r,
        _ => left == right,
    }
}
