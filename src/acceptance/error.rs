//! Failures reported by the acceptance oracle

use crate::reconciler::ReconcileError;
use crate::resource::{RoleConfig, RoleId};
use thiserror::Error;

/// An expectation about remote state that did not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostconditionError {
    #[error("{resource}: attribute {key:?} expected {expected:?}, got {actual:?}")]
    AttributeMismatch {
        resource: String,
        key: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("{resource}: attribute {key:?} expected to be unset, got {actual:?}")]
    AttributePresent {
        resource: String,
        key: String,
        actual: String,
    },

    #[error("{resource}: attribute {key:?} is not valid JSON: {actual:?}")]
    AttributeNotJson {
        resource: String,
        key: String,
        actual: String,
    },

    #[error("{resource}: identifier changed from {before} to {after} on update")]
    IdentifierChanged {
        resource: String,
        before: RoleId,
        after: RoleId,
    },

    #[error("{resource}: role {id} not found after apply")]
    MissingAfterApply { resource: String, id: RoleId },

    #[error("{resource}: imported configuration {imported:?} does not match applied {applied:?}")]
    ImportMismatch {
        resource: String,
        applied: Box<RoleConfig>,
        imported: Box<RoleConfig>,
    },

    #[error("no applied resource named {0:?}")]
    UnknownResource(String),

    #[error("import of {0:?} requested before any apply step")]
    ImportBeforeApply(String),

    #[error("role {0} still exists")]
    StillExists(RoleId),
}

/// Why a scenario failed
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario {scenario}: setup failed: {source:#}")]
    Setup {
        scenario: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("scenario {scenario}, step {step}: {source}")]
    Reconcile {
        scenario: String,
        step: usize,
        #[source]
        source: ReconcileError,
    },

    #[error("scenario {scenario}, step {step}: {source}")]
    Postcondition {
        scenario: String,
        step: usize,
        #[source]
        source: PostconditionError,
    },

    #[error("scenario {scenario}: teardown failed: {source}")]
    Teardown {
        scenario: String,
        #[source]
        source: ReconcileError,
    },

    #[error("scenario {scenario}: {source}")]
    Destroy {
        scenario: String,
        #[source]
        source: PostconditionError,
    },
}

impl ScenarioError {
    /// The oracle-level expectation that failed, if this is not a transport or setup error
    #[must_use]
    pub fn postcondition(&self) -> Option<&PostconditionError> {
        match self {
            Self::Postcondition { source, .. } | Self::Destroy { source, .. } => Some(source),
            _ => None,
        }
    }

    #[must_use]
    pub fn scenario(&self) -> &str {
        match self {
            Self::Setup { scenario, .. }
            | Self::Reconcile { scenario, .. }
            | Self::Postcondition { scenario, .. }
            | Self::Teardown { scenario, .. }
            | Self::Destroy { scenario, .. } => scenario,
        }
    }
}
