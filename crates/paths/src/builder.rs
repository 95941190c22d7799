//! PathBuilder implementation
//!
//! Provides a type-safe builder pattern for constructing Vault API paths
//! with different output formats for different consumers.

use crate::errors::PathBuilderError;
use crate::formats::PathFormat;
use crate::operations::VaultOperation;
use crate::{normalize_mount, API_PREFIX, ROLES_SEGMENT, SYS_MOUNTS};

/// Builder for constructing API paths with type safety
///
/// # Example
///
/// ```rust
/// use vault_paths::prelude::*;
///
/// let path = PathBuilder::new()
///     .operation(VaultOperation::MountEngine)
///     .mount("tf-test-aws")
///     .build_pact_path();
/// assert_eq!(path.unwrap(), "/v1/sys/mounts/tf-test-aws");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    operation: Option<VaultOperation>,
    mount: Option<String>,
    role: Option<String>,
}

impl PathBuilder {
    /// Create a new PathBuilder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn operation(mut self, operation: VaultOperation) -> Self {
        self.operation = Some(operation);
        self
    }

    #[must_use]
    pub fn mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = Some(mount.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    // Build methods
    pub fn build_http_path(&self) -> Result<String, PathBuilderError> {
        self.build(PathFormat::HttpPath)
    }

    pub fn build_pact_path(&self) -> Result<String, PathBuilderError> {
        self.build(PathFormat::PactPath)
    }

    pub fn build_resource_id(&self) -> Result<String, PathBuilderError> {
        self.build(PathFormat::ResourceId)
    }

    /// Generic build with format
    pub fn build(&self, format: PathFormat) -> Result<String, PathBuilderError> {
        let operation = self
            .operation
            .ok_or_else(|| PathBuilderError::MissingRequiredParameter("operation".to_string()))?;

        if format == PathFormat::ResourceId && !operation.targets_role() {
            return Err(PathBuilderError::InvalidFormatForOperation);
        }

        let mount = self.required_mount()?;

        let path = match operation {
            VaultOperation::MountEngine | VaultOperation::UnmountEngine => {
                format!("{SYS_MOUNTS}/{mount}")
            }
            VaultOperation::ConfigureRoot => format!("{mount}/config/root"),
            VaultOperation::ListRoles => format!("{mount}/{ROLES_SEGMENT}"),
            VaultOperation::WriteRole | VaultOperation::ReadRole | VaultOperation::DeleteRole => {
                let role = self.required_role()?;
                format!("{mount}/{ROLES_SEGMENT}/{role}")
            }
        };

        Ok(match format {
            PathFormat::HttpPath | PathFormat::ResourceId => path,
            PathFormat::PactPath => format!("{API_PREFIX}{path}"),
        })
    }

    fn required_mount(&self) -> Result<&str, PathBuilderError> {
        let raw = self
            .mount
            .as_deref()
            .ok_or_else(|| PathBuilderError::MissingRequiredParameter("mount".to_string()))?;
        let mount = normalize_mount(raw);
        if mount.is_empty() {
            return Err(PathBuilderError::InvalidParameter {
                name: "mount".to_string(),
                value: raw.to_string(),
            });
        }
        Ok(mount)
    }

    fn required_role(&self) -> Result<&str, PathBuilderError> {
        let role = self
            .role
            .as_deref()
            .ok_or_else(|| PathBuilderError::MissingRequiredParameter("role".to_string()))?;
        if role.trim().is_empty() || role.contains('/') {
            return Err(PathBuilderError::InvalidParameter {
                name: "role".to_string(),
                value: role.to_string(),
            });
        }
        Ok(role)
    }
}
