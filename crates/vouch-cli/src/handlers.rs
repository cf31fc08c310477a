//! Command handlers for CLI subcommands
//!
//! Each subcommand has its own module; document loading shared by the
//! handlers lives here.

mod check;
mod completions;
mod config;
mod validate;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use validate::handle_validate;

use crate::config::is_yaml;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use vouch_core::{Messages, SchemaInput};

/// Read a JSON or YAML document, choosing the parser by extension
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            reason: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Load a rule schema file
pub fn load_schema(path: &Path) -> Result<SchemaInput> {
    let document = load_document(path)?;
    Ok(SchemaInput::try_from(document)?)
}

/// Load a messages file mapping `field.rule` or `rule` keys to templates
pub fn load_messages(path: &Path) -> Result<Messages> {
    let document = load_document(path)?;
    serde_json::from_value(document).map_err(|e| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: "a map of message templates".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_and_json_documents() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("schema.yaml");
        let json = dir.path().join("schema.json");
        fs::write(&yaml, "username: required\nage: required|number\n").unwrap();
        fs::write(&json, r#"{"username": "required", "age": "required|number"}"#).unwrap();

        assert_eq!(load_document(&yaml).unwrap(), load_document(&json).unwrap());
        assert_eq!(load_schema(&yaml).unwrap(), load_schema(&json).unwrap());
    }

    #[test]
    fn test_invalid_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { ref expected, .. } if expected == "JSON"));
    }

    #[test]
    fn test_schema_must_be_a_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, "[\"required\"]").unwrap();

        assert!(matches!(load_schema(&path).unwrap_err(), Error::Schema(_)));
    }

    #[test]
    fn test_load_messages() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("messages.yaml");
        fs::write(&path, "required: \"{{ field }} is required\"\n").unwrap();

        let messages = load_messages(&path).unwrap();
        assert_eq!(
            messages.message_for("email", "email", "required", &[]),
            "email is required"
        );
    }
}
