//! Operation type definitions for PathBuilder

/// Vault operations used by the role provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultOperation {
    // sys/mounts operations
    MountEngine,
    UnmountEngine,

    // AWS secrets engine configuration
    ConfigureRoot,

    // Role operations
    WriteRole,
    ReadRole,
    DeleteRole,
    ListRoles,
}

impl VaultOperation {
    /// Whether the operation addresses a single named role
    #[must_use]
    pub fn targets_role(self) -> bool {
        matches!(
            self,
            VaultOperation::WriteRole | VaultOperation::ReadRole | VaultOperation::DeleteRole
        )
    }

    /// Short label used in logs and metrics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VaultOperation::MountEngine => "mount",
            VaultOperation::UnmountEngine => "unmount",
            VaultOperation::ConfigureRoot => "config_root",
            VaultOperation::WriteRole => "write",
            VaultOperation::ReadRole => "read",
            VaultOperation::DeleteRole => "delete",
            VaultOperation::ListRoles => "list",
        }
    }
}
