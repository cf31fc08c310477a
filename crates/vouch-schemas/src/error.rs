//! Error types for schema compilation and validation
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Faults raised while turning a rule schema into a compiled validator.
///
/// These are programming or configuration mistakes (unknown rule names,
/// malformed rule strings), never data-driven failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The schema document itself has the wrong shape
    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// A field path is empty or contains empty segments
    #[error("Malformed field path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// A path uses the same segment both as an object and as an array
    #[error("Conflicting field path '{path}': '{segment}' is declared both as object and as array")]
    ConflictingPath { path: String, segment: String },

    /// A pipe-delimited rule string could not be parsed
    #[error("Malformed rule '{rule}' on field '{field}': {reason}")]
    MalformedRule {
        field: String,
        rule: String,
        reason: String,
    },

    /// The rule name is not present in the rule registry
    #[error("Unknown rule '{rule}' on field '{field}'")]
    UnknownRule { field: String, rule: String },

    /// The rule rejected its arguments at compile time
    #[error("Invalid arguments for rule '{rule}' on field '{field}': {reason}")]
    InvalidArguments {
        field: String,
        rule: String,
        reason: String,
    },
}

impl CompileError {
    /// Create an invalid schema error
    pub fn invalid_schema(reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            reason: reason.into(),
        }
    }

    /// Create a malformed path error
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed rule error
    pub fn malformed_rule(
        field: impl Into<String>,
        rule: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRule {
            field: field.into(),
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown rule error
    pub fn unknown_rule(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::UnknownRule {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(
        field: impl Into<String>,
        rule: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArguments {
            field: field.into(),
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Get the field this error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedPath { path, .. } | Self::ConflictingPath { path, .. } => Some(path),
            Self::MalformedRule { field, .. }
            | Self::UnknownRule { field, .. }
            | Self::InvalidArguments { field, .. } => Some(field),
            Self::InvalidSchema { .. } => None,
        }
    }
}

/// A single failure as produced by the vanilla formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Human-readable message
    pub message: String,
    /// Name of the rule that failed
    pub validation: String,
    /// Concrete field path (`users.0.email`)
    pub field: String,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} on {})", self.message, self.validation, self.field)
    }
}

/// Ordered list of formatted validation failures.
///
/// Entries keep the order in which failures were detected. Their shape is
/// decided by the formatter that produced them.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<Value>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s) occurred:", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            match error.get("message").and_then(Value::as_str) {
                Some(message) => write!(f, "\n{}. {}", i + 1, message)?,
                None => write!(f, "\n{}. {}", i + 1, error)?,
            }
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Wrap formatter output
    pub fn new(errors: Vec<Value>) -> Self {
        Self { errors }
    }

    /// Number of collected failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the raw formatter entries
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.errors.iter()
    }

    /// Raw formatter entries
    pub fn as_slice(&self) -> &[Value] {
        &self.errors
    }

    /// Consume into the raw formatter entries
    pub fn into_inner(self) -> Vec<Value> {
        self.errors
    }

    /// Decode entries produced by the vanilla formatter.
    ///
    /// Entries of another shape are skipped.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.errors
            .iter()
            .filter_map(|e| ErrorEntry::deserialize(e).ok())
            .collect()
    }

    /// Distinct field names in detection order
    pub fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for entry in self.entries() {
            if !fields.contains(&entry.field) {
                fields.push(entry.field);
            }
        }
        fields
    }
}

impl From<Vec<Value>> for ValidationErrors {
    fn from(errors: Vec<Value>) -> Self {
        Self { errors }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_error_field() {
        let err = CompileError::unknown_rule("username", "nope");
        assert_eq!(err.field(), Some("username"));
        assert_eq!(err.to_string(), "Unknown rule 'nope' on field 'username'");

        let err = CompileError::invalid_schema("expected an object");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_validation_errors_entries() {
        let errors = ValidationErrors::new(vec![
            json!({"message": "required validation failed on a", "validation": "required", "field": "a"}),
            json!({"title": "email", "detail": "bad", "source": {"pointer": "b"}}),
        ]);

        assert_eq!(errors.len(), 2);
        let entries = errors.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].field, "a");
        assert_eq!(errors.fields(), vec!["a".to_string()]);
    }

    #[test]
    fn test_validation_errors_display() {
        let errors = ValidationErrors::new(vec![
            json!({"message": "first", "validation": "required", "field": "a"}),
        ]);
        let rendered = errors.to_string();
        assert!(rendered.contains("1 validation error(s)"));
        assert!(rendered.contains("1. first"));
    }
}
