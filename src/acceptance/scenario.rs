//! Scenario definitions: ordered steps plus an optional backend mount

use super::checks::Check;
use crate::provider::BackendMount;
use crate::resource::RoleConfig;

/// One step of a scenario
#[derive(Debug, Clone)]
pub enum Step {
    /// Apply every resource (by local name) and evaluate the checks afterwards.
    /// Previously applied resources missing from `resources` are destroyed.
    Apply {
        resources: Vec<(String, RoleConfig)>,
        checks: Vec<Check>,
    },
    /// Import `resource` by its identifier and compare with the applied configuration
    Import { resource: String },
}

impl Step {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Apply { .. } => "apply",
            Self::Import { .. } => "import",
        }
    }
}

/// A named sequence of steps, always followed by destroy and an absence check
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    /// Engine to mount before the first step and unmount after destroy
    pub mount: Option<BackendMount>,
    pub steps: Vec<Step>,
}

impl Scenario {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount: None,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mount(mut self, mount: BackendMount) -> Self {
        self.mount = Some(mount);
        self
    }

    #[must_use]
    pub fn apply<I, S>(mut self, resources: I, checks: Vec<Check>) -> Self
    where
        I: IntoIterator<Item = (S, RoleConfig)>,
        S: Into<String>,
    {
        self.steps.push(Step::Apply {
            resources: resources
                .into_iter()
                .map(|(name, config)| (name.into(), config))
                .collect(),
            checks,
        });
        self
    }

    #[must_use]
    pub fn import(mut self, resource: impl Into<String>) -> Self {
        self.steps.push(Step::Import {
            resource: resource.into(),
        });
        self
    }
}

/// Where a [`ScenarioRunner`](super::ScenarioRunner) is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    /// `n` apply steps have completed
    Applied(usize),
    Imported,
    Destroyed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Applied(n) => write!(f, "applied({n})"),
            Self::Imported => write!(f, "imported"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Summary of a passed scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: String,
    pub steps: usize,
    /// Identifiers verified absent after destroy
    pub destroyed: Vec<String>,
}
