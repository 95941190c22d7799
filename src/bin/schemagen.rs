//! # Schema Generator
//!
//! Prints the JSON Schema of the role configuration block, the contract the
//! host uses to validate `vault_aws_secret_backend_role` definitions.
//!
//! ```bash
//! cargo run --bin schemagen > schema/aws_secret_backend_role.json
//! ```

use anyhow::Result;
use vault_role_provider::resource::RoleConfig;

fn main() -> Result<()> {
    let schema = schemars::schema_for!(RoleConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
