//! Role definition files
//!
//! A file holds either a single role or a list of roles. Files ending in
//! `.json` are parsed as JSON, everything else as YAML.

use super::RoleConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleFile {
    Many(Vec<RoleConfig>),
    One(RoleConfig),
}

impl From<RoleFile> for Vec<RoleConfig> {
    fn from(file: RoleFile) -> Self {
        match file {
            RoleFile::Many(roles) => roles,
            RoleFile::One(role) => vec![role],
        }
    }
}

/// Load role definitions from a YAML or JSON file
pub fn load_role_configs(path: &Path) -> Result<Vec<RoleConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read role file: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let file: RoleFile = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON role file: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML role file: {}", path.display()))?
    };

    let roles: Vec<RoleConfig> = file.into();
    debug!("Loaded {} role(s) from {}", roles.len(), path.display());
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_single_yaml_role() {
        let file = write_temp(
            ".yaml",
            "name: deploy\nbackend: aws\ncredential_type: assumed_role\nrole_arns:\n  - arn:aws:iam::123456789123:role/foo\n",
        );
        let roles = load_role_configs(file.path()).unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_arns, vec!["arn:aws:iam::123456789123:role/foo"]);
    }

    #[test]
    fn test_json_role_list() {
        let file = write_temp(
            ".json",
            r#"[
                {"name": "a", "backend": "aws", "credential_type": "iam_user",
                 "policy_document": "{\"Version\":\"2012-10-17\"}"},
                {"name": "b", "backend": "aws", "credential_type": "federation_token"}
            ]"#,
        );
        let roles = load_role_configs(file.path()).unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].policy_document(), Some("{\"Version\":\"2012-10-17\"}"));
        assert_eq!(roles[1].credential_type, "federation_token");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_role_configs(Path::new("/nonexistent/roles.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/roles.yaml"));
    }
}
