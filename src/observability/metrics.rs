//! # Metrics
//!
//! Prometheus metrics for role reconciliation and acceptance runs.
//!
//! ## Metrics Exposed
//!
//! - `vault_role_operations_total{operation}` - Vault API operations completed
//! - `vault_role_operation_duration_seconds{operation}` - Duration of Vault API operations
//! - `vault_role_operation_errors_total{operation}` - Vault API operations that failed
//! - `vault_role_validation_errors_total` - Role configurations rejected before any request
//! - `vault_role_scenarios_total{outcome}` - Acceptance scenarios by outcome (`passed`, `failed`)

use anyhow::{Context, Result};
use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vault_role_operations_total",
            "Total number of Vault API operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "vault_role_operation_duration_seconds",
            "Duration of Vault API operations in seconds by operation",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vault_role_operation_errors_total",
            "Total number of failed Vault API operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static VALIDATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "vault_role_validation_errors_total",
        "Total number of role configurations rejected by validation",
    )
    .expect("Failed to create VALIDATION_ERRORS_TOTAL metric - this should never happen")
});

static SCENARIOS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "vault_role_scenarios_total",
            "Total number of acceptance scenarios by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create SCENARIOS_TOTAL metric - this should never happen")
});

#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
/// Register every metric with the crate registry. Call once per process.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VALIDATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SCENARIOS_TOTAL.clone()))?;

    Ok(())
}

/// Render the registry in the Prometheus text exposition format
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}

pub fn record_operation(operation: &str, duration: f64) {
    OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_operation_errors(operation: &str) {
    OPERATION_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn increment_validation_errors() {
    VALIDATION_ERRORS_TOTAL.inc();
}

pub fn record_scenario_outcome(passed: bool) {
    let outcome = if passed { "passed" } else { "failed" };
    SCENARIOS_TOTAL.with_label_values(&[outcome]).inc();
}
