//! On-disk block document format

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlblock_core::{BlockError, ConnectorSettings, Result};
use tracing::warn;

use crate::env::EnvSubstitutor;

/// Block type tag written into every document
pub const BLOCK_TYPE: &str = "sql-connector";

const DOCUMENT_VERSION: u32 = 1;

/// Regex pattern for valid block names (lower-kebab-case or lower_snake_case)
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap());

/// Check that a block name is usable as a storage key
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BlockError::Configuration(
            "Block name cannot be empty".to_string(),
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(BlockError::Configuration(format!(
            "Invalid block name '{}': use lowercase letters, digits, '-' or '_'",
            name
        )));
    }
    Ok(())
}

/// Serialized block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDocument {
    pub block_type: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub data: ConnectorSettings,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

impl BlockDocument {
    pub fn new(name: impl Into<String>, data: ConnectorSettings) -> Self {
        Self {
            block_type: BLOCK_TYPE.to_string(),
            name: name.into(),
            version: DOCUMENT_VERSION,
            data,
        }
    }

    /// Render the document as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| BlockError::Serialization(e.to_string()))
    }

    /// Parse a document saved under `name`, substituting environment
    /// placeholders first
    pub fn from_yaml(name: &str, content: &str) -> Result<Self> {
        let substituted = EnvSubstitutor::new().substitute(content)?;

        let document: BlockDocument = serde_yaml::from_str(&substituted).map_err(|e| {
            BlockError::Configuration(format!("Block '{}' is malformed: {}", name, e))
        })?;

        if document.block_type != BLOCK_TYPE {
            return Err(BlockError::Configuration(format!(
                "Block '{}' has type '{}', expected '{}'",
                name, document.block_type, BLOCK_TYPE
            )));
        }
        if document.name != name {
            warn!(
                "Block saved as '{}' declares name '{}'",
                name, document.name
            );
        }

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlblock_core::{ConnectionComponents, ConnectionConfig};
    use sqlblock_types::Driver;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("warehouse").is_ok());
        assert!(validate_name("pg-main_2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("Upper").is_err());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("-leading").is_err());
    }

    #[test]
    fn test_document_yaml_roundtrip() {
        let settings = ConnectorSettings::new(
            ConnectionComponents::new(Driver::PostgresqlAsync)
                .with_username("etl")
                .with_password("secret")
                .with_host("localhost")
                .with_database("warehouse"),
        )
        .with_fetch_size(50);
        let yaml = BlockDocument::new("warehouse", settings.clone())
            .to_yaml()
            .unwrap();
        assert!(yaml.contains("block_type: sql-connector"));
        assert!(yaml.contains("postgresql+async"));

        let parsed = BlockDocument::from_yaml("warehouse", &yaml).unwrap();
        assert_eq!(parsed.data, settings);
    }

    #[test]
    fn test_document_env_substitution() {
        std::env::set_var("SQLBLOCK_DOC_TEST_URL", "sqlite+async:///app.db");
        let yaml = r#"
block_type: sql-connector
name: local
data:
  connection:
    connection_string: "{{ env.SQLBLOCK_DOC_TEST_URL }}"
"#;
        let parsed = BlockDocument::from_yaml("local", yaml).unwrap();
        assert_eq!(
            parsed.data.connection,
            ConnectionConfig::url("sqlite+async:///app.db").unwrap()
        );
        std::env::remove_var("SQLBLOCK_DOC_TEST_URL");
    }

    #[test]
    fn test_document_rejects_wrong_type_and_both_forms() {
        let yaml = r#"
block_type: s3-bucket
name: local
data:
  connection:
    connection_string: "sqlite://"
"#;
        assert!(BlockDocument::from_yaml("local", yaml)
            .unwrap_err()
            .is_configuration());

        let yaml = r#"
block_type: sql-connector
name: local
data:
  connection:
    connection_string: "sqlite://"
    components:
      driver: sqlite
      database: app.db
"#;
        assert!(BlockDocument::from_yaml("local", yaml)
            .unwrap_err()
            .is_configuration());
    }
}
