//! # Logging
//!
//! `tracing-subscriber` setup shared by the CLI and the test suites.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `log_level`
/// (`ERROR`, `WARN`, `INFO`, `DEBUG`, `TRACE`). Calling this more than once
/// is harmless: later calls leave the first subscriber in place.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("vault_role_provider={}", log_level.to_lowercase()).into()
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
