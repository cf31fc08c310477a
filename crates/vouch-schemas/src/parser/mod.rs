//! Rule schema parsing
//!
//! A raw schema maps field paths to rules, either as a pipe-delimited
//! string or as a list of already-parsed rules:
//!
//! ```rust
//! use vouch_schemas::parser::RawSchema;
//! use serde_json::json;
//!
//! let raw = RawSchema::try_from(json!({
//!     "username": "required|min:3",
//!     "users.*.email": "required|email",
//! }))?;
//! let parsed = raw.parse()?;
//! assert_eq!(parsed.field_names(), vec!["username", "users"]);
//! # Ok::<(), vouch_schemas::CompileError>(())
//! ```
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

pub mod tree;

pub use tree::{NodeKind, ParsedSchema, SchemaNode, PATH_SEPARATOR, WILDCARD};

use crate::error::{CompileError, CompileResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between rules in a rule string
pub const RULE_SEPARATOR: char = '|';
/// Separator between a rule name and its arguments
pub const ARGS_SEPARATOR: char = ':';
/// Separator between rule arguments
pub const ARG_SEPARATOR: char = ',';

/// A rule name with its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRule {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl ParsedRule {
    /// Create a rule without arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a rule with arguments
    pub fn with_args(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Rules declared for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRules {
    /// `"required|email|ends_with:.com"`
    Pipe(String),
    /// `[{"name": "required"}, {"name": "regex", "args": ["^a|b$"]}]`
    List(Vec<ParsedRule>),
}

impl RawRules {
    /// Resolve into parsed rules; `field` is only used for error context
    pub fn parse(&self, field: &str) -> CompileResult<Vec<ParsedRule>> {
        match self {
            Self::Pipe(rules) => parse_rules(field, rules),
            Self::List(rules) => {
                for rule in rules {
                    if rule.name.trim().is_empty() {
                        return Err(CompileError::malformed_rule(
                            field,
                            &rule.name,
                            "rule name cannot be empty",
                        ));
                    }
                }
                Ok(rules.clone())
            }
        }
    }
}

impl From<&str> for RawRules {
    fn from(rules: &str) -> Self {
        Self::Pipe(rules.to_string())
    }
}

impl From<String> for RawRules {
    fn from(rules: String) -> Self {
        Self::Pipe(rules)
    }
}

impl From<Vec<ParsedRule>> for RawRules {
    fn from(rules: Vec<ParsedRule>) -> Self {
        Self::List(rules)
    }
}

/// Declarative schema: ordered field path → rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSchema {
    fields: Vec<(String, RawRules)>,
}

impl RawSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declaration, keeping declaration order
    pub fn field(mut self, path: impl Into<String>, rules: impl Into<RawRules>) -> Self {
        self.fields.push((path.into(), rules.into()));
        self
    }

    /// Declared field paths and rules in declaration order
    pub fn fields(&self) -> &[(String, RawRules)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse into the schema tree
    pub fn parse(&self) -> CompileResult<ParsedSchema> {
        let mut schema = ParsedSchema::default();
        for (path, rules) in &self.fields {
            let rules = rules.parse(path)?;
            schema.insert(path, rules)?;
        }
        Ok(schema)
    }
}

impl<K, R> FromIterator<(K, R)> for RawSchema
where
    K: Into<String>,
    R: Into<RawRules>,
{
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(path, rules)| (path.into(), rules.into()))
                .collect(),
        }
    }
}

impl TryFrom<Value> for RawSchema {
    type Error = CompileError;

    fn try_from(value: Value) -> CompileResult<Self> {
        let Value::Object(map) = value else {
            return Err(CompileError::invalid_schema(
                "schema must be an object mapping fields to rules",
            ));
        };

        let mut fields = Vec::with_capacity(map.len());
        for (path, rules) in map {
            let rules = RawRules::deserialize(&rules).map_err(|_| {
                CompileError::invalid_schema(format!(
                    "rules for '{}' must be a rule string or a list of rules",
                    path
                ))
            })?;
            fields.push((path, rules));
        }
        Ok(Self { fields })
    }
}

impl<'de> Deserialize<'de> for RawSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Parse a pipe-delimited rule string such as `required|above:4|in:a,b`.
///
/// An empty or whitespace-only string declares the field without rules.
pub fn parse_rules(field: &str, rules: &str) -> CompileResult<Vec<ParsedRule>> {
    if rules.trim().is_empty() {
        return Ok(Vec::new());
    }

    rules
        .split(RULE_SEPARATOR)
        .map(|segment| parse_rule(field, segment))
        .collect()
}

fn parse_rule(field: &str, segment: &str) -> CompileResult<ParsedRule> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(CompileError::malformed_rule(
            field,
            segment,
            "empty rule between separators",
        ));
    }

    let (name, args) = match segment.split_once(ARGS_SEPARATOR) {
        Some((name, args)) => (name.trim(), Some(args)),
        None => (segment, None),
    };

    if name.is_empty() {
        return Err(CompileError::malformed_rule(
            field,
            segment,
            "rule name cannot be empty",
        ));
    }

    let args = args
        .map(|args| {
            args.split(ARG_SEPARATOR)
                .map(|arg| Value::String(arg.trim().to_string()))
                .collect()
        })
        .unwrap_or_default();

    Ok(ParsedRule::with_args(name, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rules_with_arguments() {
        let rules = parse_rules("age", "required | number|above:4|range:1, 10").unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0], ParsedRule::new("required"));
        assert_eq!(rules[2], ParsedRule::with_args("above", vec![json!("4")]));
        assert_eq!(
            rules[3],
            ParsedRule::with_args("range", vec![json!("1"), json!("10")])
        );
    }

    #[test]
    fn test_parse_rules_keeps_colons_in_arguments() {
        let rules = parse_rules("url", "starts_with:https://").unwrap();
        assert_eq!(rules[0].args, vec![json!("https://")]);
    }

    #[test]
    fn test_parse_rules_empty_string() {
        assert!(parse_rules("name", "  ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rules_rejects_empty_segment() {
        let err = parse_rules("name", "required||email").unwrap_err();
        assert!(matches!(err, CompileError::MalformedRule { .. }));

        let err = parse_rules("name", ":3").unwrap_err();
        assert!(matches!(err, CompileError::MalformedRule { .. }));
    }

    #[test]
    fn test_raw_schema_from_value_preserves_order() {
        let raw = RawSchema::try_from(json!({
            "zeta": "required",
            "alpha": [{"name": "string"}],
            "mid": "required|email",
        }))
        .unwrap();

        let names: Vec<&str> = raw.fields().iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(matches!(raw.fields()[1].1, RawRules::List(_)));
    }

    #[test]
    fn test_raw_schema_rejects_non_object() {
        assert!(RawSchema::try_from(json!(["required"])).is_err());
        assert!(RawSchema::try_from(json!({"a": 42})).is_err());
    }

    #[test]
    fn test_raw_schema_from_iterator() {
        let raw: RawSchema = [("username", "required"), ("age", "required")]
            .into_iter()
            .collect();
        assert_eq!(raw.fields().len(), 2);
    }
}
