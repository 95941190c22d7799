//! Output format definitions for PathBuilder
//!
//! Different consumers need different path formats:
//! - HttpPath: path relative to the API prefix, used by the role client
//! - PactPath: absolute request path, used by contract tests and the mock server
//! - ResourceId: remote identifier of a role, used for import

/// Output format for path construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathFormat {
    /// Path without the API prefix: "aws/roles/deploy"
    HttpPath,

    /// Absolute request path: "/v1/aws/roles/deploy"
    PactPath,

    /// Role identifier: "aws/roles/deploy" (role operations only)
    ResourceId,
}
