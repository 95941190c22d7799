//! Shared span and metric bookkeeping for Vault operations

use crate::observability::metrics;
use std::time::{Duration, Instant};
use tracing::Span;
use vault_paths::prelude::VaultOperation;

/// Records operation metrics and span attributes for a successful operation
pub(crate) fn record_success_metrics(span: &Span, operation: VaultOperation, duration: Duration) {
    span.record("operation.duration_ms", duration_ms(duration));
    span.record("operation.success", true);
    metrics::record_operation(operation.as_str(), duration.as_secs_f64());
}

/// Records operation metrics and span attributes for a failed operation
pub(crate) fn record_error_metrics(
    span: &Span,
    operation: VaultOperation,
    error_message: &str,
    duration: Duration,
) {
    span.record("operation.success", false);
    span.record("error.message", error_message);
    span.record("operation.duration_ms", duration_ms(duration));
    metrics::increment_operation_errors(operation.as_str());
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Helper struct for tracking operation state
pub(crate) struct OperationTracker {
    operation: VaultOperation,
    start: Instant,
    span: Span,
}

impl OperationTracker {
    pub(crate) fn new(operation: VaultOperation, span: Span) -> Self {
        Self {
            operation,
            start: Instant::now(),
            span,
        }
    }

    pub(crate) fn record_success(&self) {
        record_success_metrics(&self.span, self.operation, self.start.elapsed());
    }

    pub(crate) fn record_error(&self, error_message: &str) {
        record_error_metrics(
            &self.span,
            self.operation,
            error_message,
            self.start.elapsed(),
        );
    }

    /// Record the outcome of `result` and hand it back unchanged
    pub(crate) fn finish<T>(&self, result: anyhow::Result<T>) -> anyhow::Result<T> {
        match &result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_error(&format!("{e:#}")),
        }
        result
    }
}
