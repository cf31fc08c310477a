//! Error formatters and custom error collectors
//!
//! A formatter turns raw rule failures into user-facing entries. A fresh
//! formatter is built for every execution through a [`FormatterFactory`].
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use crate::error::ErrorEntry;
use crate::messages::Messages;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// Collects failures and renders them as JSON entries
pub trait ErrorFormatter {
    /// Record one failure
    fn add_error(&mut self, message: &str, field: &str, rule: &str, args: &[Value]);

    /// Rendered entries, `None` when nothing was recorded
    fn to_errors(&self) -> Option<Vec<Value>>;
}

/// Produces `{message, validation, field}` entries
#[derive(Debug, Default)]
pub struct VanillaFormatter {
    errors: Vec<ErrorEntry>,
}

impl VanillaFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorFormatter for VanillaFormatter {
    fn add_error(&mut self, message: &str, field: &str, rule: &str, _args: &[Value]) {
        self.errors.push(ErrorEntry {
            message: message.to_string(),
            validation: rule.to_string(),
            field: field.to_string(),
        });
    }

    fn to_errors(&self) -> Option<Vec<Value>> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| {
                    json!({
                        "message": e.message,
                        "validation": e.validation,
                        "field": e.field,
                    })
                })
                .collect(),
        )
    }
}

/// Produces JSON:API style `{title, detail, source: {pointer}}` entries
#[derive(Debug, Default)]
pub struct JsonApiFormatter {
    errors: Vec<Value>,
}

impl JsonApiFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorFormatter for JsonApiFormatter {
    fn add_error(&mut self, message: &str, field: &str, rule: &str, _args: &[Value]) {
        self.errors.push(json!({
            "title": rule,
            "detail": message,
            "source": { "pointer": field },
        }));
    }

    fn to_errors(&self) -> Option<Vec<Value>> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.clone())
        }
    }
}

type BuildFormatter = dyn Fn() -> Box<dyn ErrorFormatter> + Send + Sync;

/// Builds a fresh formatter for each execution
#[derive(Clone)]
pub struct FormatterFactory {
    name: &'static str,
    build: Arc<BuildFormatter>,
}

impl fmt::Debug for FormatterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterFactory")
            .field("name", &self.name)
            .finish()
    }
}

impl Default for FormatterFactory {
    fn default() -> Self {
        Self::vanilla()
    }
}

impl FormatterFactory {
    /// Custom formatter
    pub fn new<F>(name: &'static str, build: F) -> Self
    where
        F: Fn() -> Box<dyn ErrorFormatter> + Send + Sync + 'static,
    {
        Self {
            name,
            build: Arc::new(build),
        }
    }

    pub fn vanilla() -> Self {
        Self::new("vanilla", || Box::new(VanillaFormatter::new()))
    }

    pub fn json_api() -> Self {
        Self::new("jsonapi", || Box::new(JsonApiFormatter::new()))
    }

    /// Look up a built-in formatter by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "vanilla" => Some(Self::vanilla()),
            "jsonapi" | "json_api" => Some(Self::json_api()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn build(&self) -> Box<dyn ErrorFormatter> {
        (self.build)()
    }
}

type CollectFn = dyn Fn(&mut dyn ErrorFormatter, &Messages, &str, &str, &[Value]) + Send + Sync;

/// Hook that owns message construction for every failure.
///
/// Called with `(formatter, messages, field, rule, args)`; whatever it adds
/// to the formatter becomes the error entry.
#[derive(Clone)]
pub struct ErrorCollector {
    collect: Arc<CollectFn>,
}

impl fmt::Debug for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorCollector(..)")
    }
}

impl ErrorCollector {
    pub fn new<F>(collect: F) -> Self
    where
        F: Fn(&mut dyn ErrorFormatter, &Messages, &str, &str, &[Value]) + Send + Sync + 'static,
    {
        Self {
            collect: Arc::new(collect),
        }
    }

    pub fn collect(
        &self,
        formatter: &mut dyn ErrorFormatter,
        messages: &Messages,
        field: &str,
        rule: &str,
        args: &[Value],
    ) {
        (self.collect)(formatter, messages, field, rule, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vanilla_formatter() {
        let mut formatter = VanillaFormatter::new();
        assert!(formatter.to_errors().is_none());

        formatter.add_error("required validation failed on username", "username", "required", &[]);
        assert_eq!(
            formatter.to_errors().unwrap(),
            vec![json!({
                "message": "required validation failed on username",
                "validation": "required",
                "field": "username",
            })]
        );
    }

    #[test]
    fn test_json_api_formatter() {
        let mut formatter = FormatterFactory::json_api().build();
        formatter.add_error("bad email", "users.0.email", "email", &[]);
        assert_eq!(
            formatter.to_errors().unwrap(),
            vec![json!({
                "title": "email",
                "detail": "bad email",
                "source": {"pointer": "users.0.email"},
            })]
        );
    }

    #[test]
    fn test_factory_by_name() {
        assert_eq!(FormatterFactory::by_name("jsonapi").unwrap().name(), "jsonapi");
        assert_eq!(FormatterFactory::default().name(), "vanilla");
        assert!(FormatterFactory::by_name("xml").is_none());
    }

    #[test]
    fn test_error_collector_writes_through_formatter() {
        let collector = ErrorCollector::new(|formatter, _messages, field, rule, args| {
            formatter.add_error("Validation failed", field, rule, args);
        });
        let mut formatter = VanillaFormatter::new();
        collector.collect(&mut formatter, &Messages::new(), "age", "required", &[]);

        let errors = formatter.to_errors().unwrap();
        assert_eq!(errors[0]["message"], "Validation failed");
        assert_eq!(errors[0]["field"], "age");
    }
}
