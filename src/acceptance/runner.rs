//! # Scenario Runner
//!
//! Drives one [`Scenario`] through `Init -> Applied(n) -> Imported -> Destroyed`.
//!
//! Steps run strictly in order and the first failure aborts the rest. Teardown
//! (destroy every role the scenario touched, unmount its backend, verify the
//! roles are gone) always runs; after a failure its own errors are only logged
//! and the original failure is returned.

use super::checks::Check;
use super::error::{PostconditionError, ScenarioError};
use super::scenario::{Phase, Scenario, ScenarioReport, Step};
use crate::observability::metrics;
use crate::provider::MountClient;
use crate::reconciler::{ReconcileError, Reconciler};
use crate::resource::{RoleConfig, RoleId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

#[derive(Debug, Clone)]
struct AppliedResource {
    id: RoleId,
    config: RoleConfig,
}

/// Failure of a single step, before it is tagged with scenario and step number
enum StepError {
    Reconcile(ReconcileError),
    Postcondition(PostconditionError),
}

impl From<ReconcileError> for StepError {
    fn from(e: ReconcileError) -> Self {
        Self::Reconcile(e)
    }
}

impl From<PostconditionError> for StepError {
    fn from(e: PostconditionError) -> Self {
        Self::Postcondition(e)
    }
}

pub struct ScenarioRunner {
    reconciler: Reconciler,
    mounts: Option<Arc<dyn MountClient>>,
    phase: Phase,
    applies: usize,
    applied: BTreeMap<String, AppliedResource>,
    /// Every identifier a write was sent for; all of them must be gone after destroy
    known: BTreeSet<RoleId>,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("phase", &self.phase)
            .field("applied", &self.applied.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler,
            mounts: None,
            phase: Phase::Init,
            applies: 0,
            applied: BTreeMap::new(),
            known: BTreeSet::new(),
        }
    }

    /// Client used for scenarios that mount their own backend
    #[must_use]
    pub fn with_mounts(mut self, mounts: Arc<dyn MountClient>) -> Self {
        self.mounts = Some(mounts);
        self
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run `scenario` to completion, including teardown
    ///
    /// # Errors
    /// Returns the first failure; see [`ScenarioError`]
    pub async fn run(&mut self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        self.reset();
        let span = info_span!(
            "acceptance.scenario",
            scenario = %scenario.name,
            steps = scenario.steps.len(),
        );

        async {
            info!("Running scenario {}", scenario.name);
            let result = match self.setup(scenario).await {
                Ok(()) => {
                    let outcome = self.run_steps(scenario).await;
                    let teardown = self.teardown(scenario).await;
                    match (outcome, teardown) {
                        (Ok(()), Ok(destroyed)) => Ok(ScenarioReport {
                            scenario: scenario.name.clone(),
                            steps: scenario.steps.len(),
                            destroyed,
                        }),
                        (Ok(()), Err(e)) => Err(e),
                        (Err(e), teardown) => {
                            if let Err(teardown_error) = teardown {
                                warn!("Teardown after failure did not complete: {}", teardown_error);
                            }
                            Err(e)
                        }
                    }
                }
                Err(e) => Err(e),
            };

            metrics::record_scenario_outcome(result.is_ok());
            match &result {
                Ok(report) => info!("Scenario {} passed ({} steps)", report.scenario, report.steps),
                Err(e) => error!("{}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn reset(&mut self) {
        self.phase = Phase::Init;
        self.applies = 0;
        self.applied.clear();
        self.known.clear();
    }

    async fn setup(&self, scenario: &Scenario) -> Result<(), ScenarioError> {
        let Some(mount) = &scenario.mount else {
            return Ok(());
        };
        let setup_error = |source: anyhow::Error| ScenarioError::Setup {
            scenario: scenario.name.clone(),
            source,
        };
        let client = self.mounts.as_ref().ok_or_else(|| {
            setup_error(anyhow::anyhow!(
                "backend {} must be mounted but no mount client is configured",
                mount.path
            ))
        })?;

        if let Err(e) = client.mount(mount).await {
            if let Err(cleanup) = client.unmount(&mount.path).await {
                warn!("Failed to unmount {} after setup error: {:#}", mount.path, cleanup);
            }
            return Err(setup_error(e));
        }
        Ok(())
    }

    async fn run_steps(&mut self, scenario: &Scenario) -> Result<(), ScenarioError> {
        for (index, step) in scenario.steps.iter().enumerate() {
            let number = index + 1;
            debug!(step = number, kind = step.kind(), phase = %self.phase, "Running step");

            let outcome = match step {
                Step::Apply { resources, checks } => self.apply_step(resources, checks).await,
                Step::Import { resource } => self.import_step(resource).await,
            };

            outcome.map_err(|e| match e {
                StepError::Reconcile(source) => ScenarioError::Reconcile {
                    scenario: scenario.name.clone(),
                    step: number,
                    source,
                },
                StepError::Postcondition(source) => ScenarioError::Postcondition {
                    scenario: scenario.name.clone(),
                    step: number,
                    source,
                },
            })?;
        }
        Ok(())
    }

    async fn apply_step(
        &mut self,
        resources: &[(String, RoleConfig)],
        checks: &[Check],
    ) -> Result<(), StepError> {
        for (local, config) in resources {
            let state = match self.reconciler.apply(config).await {
                Ok(state) => state,
                Err(e) => {
                    // A rejected configuration never reaches Vault
                    if !e.is_validation() {
                        if let Ok(id) = RoleId::new(&config.backend, &config.name) {
                            self.known.insert(id);
                        }
                    }
                    return Err(e.into());
                }
            };
            self.known.insert(state.id.clone());

            let previous = self.applied.insert(
                local.clone(),
                AppliedResource {
                    id: state.id.clone(),
                    config: config.clone(),
                },
            );
            if let Some(previous) = previous {
                if previous.id != state.id {
                    return Err(PostconditionError::IdentifierChanged {
                        resource: local.clone(),
                        before: previous.id,
                        after: state.id,
                    }
                    .into());
                }
            }
        }

        let dropped: Vec<String> = self
            .applied
            .keys()
            .filter(|local| !resources.iter().any(|(name, _)| name == *local))
            .cloned()
            .collect();
        for local in dropped {
            if let Some(resource) = self.applied.remove(&local) {
                info!("Destroying {} ({}), no longer configured", local, resource.id);
                self.reconciler.destroy(&resource.id).await?;
            }
        }

        let mut snapshot = BTreeMap::new();
        for (local, resource) in &self.applied {
            let state = self.reconciler.refresh(&resource.id).await?.ok_or_else(|| {
                PostconditionError::MissingAfterApply {
                    resource: local.clone(),
                    id: resource.id.clone(),
                }
            })?;
            snapshot.insert(local.clone(), state.attributes());
        }

        for check in checks {
            let attrs = snapshot
                .get(check.resource())
                .ok_or_else(|| PostconditionError::UnknownResource(check.resource().to_string()))?;
            check.evaluate(attrs)?;
        }

        self.applies += 1;
        self.phase = Phase::Applied(self.applies);
        Ok(())
    }

    async fn import_step(&mut self, resource: &str) -> Result<(), StepError> {
        if self.applies == 0 {
            return Err(PostconditionError::ImportBeforeApply(resource.to_string()).into());
        }
        let applied = self
            .applied
            .get(resource)
            .ok_or_else(|| PostconditionError::UnknownResource(resource.to_string()))?;

        let imported = self.reconciler.import(&applied.id.to_string()).await?;
        if !imported.is_equivalent_to(&applied.config) {
            return Err(PostconditionError::ImportMismatch {
                resource: resource.to_string(),
                applied: Box::new(applied.config.clone()),
                imported: Box::new(imported),
            }
            .into());
        }

        self.phase = Phase::Imported;
        Ok(())
    }

    /// Destroy, unmount and verify absence. Returns the identifiers checked.
    async fn teardown(&mut self, scenario: &Scenario) -> Result<Vec<String>, ScenarioError> {
        self.applied.clear();
        let mut first_error: Option<ReconcileError> = None;

        for id in &self.known {
            if let Err(e) = self.reconciler.destroy(id).await {
                warn!("Failed to destroy {}: {}", id, e);
                first_error.get_or_insert(e);
            }
        }

        if let (Some(mount), Some(client)) = (&scenario.mount, &self.mounts) {
            if let Err(e) = client.unmount(&mount.path).await {
                warn!("Failed to unmount {}: {:#}", mount.path, e);
                first_error.get_or_insert(ReconcileError::Transport(e));
            }
        }
        self.phase = Phase::Destroyed;

        if let Some(source) = first_error {
            return Err(ScenarioError::Teardown {
                scenario: scenario.name.clone(),
                source,
            });
        }

        for id in &self.known {
            let remaining = self.reconciler.refresh(id).await.map_err(|source| {
                ScenarioError::Teardown {
                    scenario: scenario.name.clone(),
                    source,
                }
            })?;
            if remaining.is_some() {
                return Err(ScenarioError::Destroy {
                    scenario: scenario.name.clone(),
                    source: PostconditionError::StillExists(id.clone()),
                });
            }
        }

        Ok(self.known.iter().map(ToString::to_string).collect())
    }
}
