//! Runs independent scenarios concurrently

use super::error::ScenarioError;
use super::runner::ScenarioRunner;
use super::scenario::{Scenario, ScenarioReport};
use crate::provider::MountClient;
use crate::reconciler::Reconciler;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::info;

/// Outcome of every scenario in a suite run, in completion order
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub passed: Vec<ScenarioReport>,
    pub failed: Vec<ScenarioError>,
}

impl SuiteReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `scenarios` with at most `max_concurrent` in flight. Steps inside a
/// scenario stay sequential; each scenario gets its own runner.
pub async fn run_suite(
    reconciler: &Reconciler,
    mounts: Arc<dyn MountClient>,
    scenarios: Vec<Scenario>,
    max_concurrent: usize,
) -> SuiteReport {
    info!(
        "Running {} acceptance scenarios (max {} concurrent)",
        scenarios.len(),
        max_concurrent
    );

    let results: Vec<Result<ScenarioReport, ScenarioError>> = stream::iter(scenarios)
        .map(|scenario| {
            let mut runner =
                ScenarioRunner::new(reconciler.clone()).with_mounts(Arc::clone(&mounts));
            async move { runner.run(&scenario).await }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = SuiteReport::default();
    for result in results {
        match result {
            Ok(passed) => report.passed.push(passed),
            Err(failed) => report.failed.push(failed),
        }
    }
    info!(
        "Acceptance suite finished: {} passed, {} failed",
        report.passed.len(),
        report.failed.len()
    );
    report
}
