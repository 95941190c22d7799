//! # Acceptance Oracle
//!
//! Scenario-driven verification of the role resource against a live (or mock)
//! Vault:
//!
//! - apply a configuration, then apply an updated one in place
//! - import each role by identifier and compare with what was applied
//! - destroy everything and confirm the roles are gone
//!
//! [`fixtures`] holds the built-in scenarios; [`run_suite`] runs several
//! scenarios concurrently.

pub mod checks;
pub mod error;
pub mod fixtures;
pub mod runner;
pub mod scenario;
pub mod suite;

pub use checks::{attr, attr_absent, attr_json, Check};
pub use error::{PostconditionError, ScenarioError};
pub use runner::ScenarioRunner;
pub use scenario::{Phase, Scenario, ScenarioReport, Step};
pub use suite::{run_suite, SuiteReport};
