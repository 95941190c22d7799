//! # Prelude
//!
//! Re-exports commonly used types for convenience.
//!
//! ```rust
//! use vault_paths::prelude::*;
//!
//! let id = PathBuilder::new()
//!     .operation(VaultOperation::ReadRole)
//!     .mount("aws")
//!     .role("deploy")
//!     .build_resource_id();
//! ```

pub use crate::builder::PathBuilder;
pub use crate::errors::PathBuilderError;
pub use crate::formats::PathFormat;
pub use crate::operations::VaultOperation;
pub use crate::{normalize_mount, split_role_path, API_PREFIX, ROLES_SEGMENT, SYS_MOUNTS};
