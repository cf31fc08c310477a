//! Custom error messages
//!
//! Messages are keyed either by `field.rule` (the field as written in the
//! schema, wildcards included) or by `rule` alone. The field-specific key
//! wins. Text templates may reference `{{ field }}`, `{{ validation }}` and
//! `{{ argument.N }}`.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use serde::Deserialize;
use serde_json::Value;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[0-9]+)?)\s*\}\}")
            .expect("placeholder pattern is valid")
    })
}

type MessageFn = dyn Fn(&str, &str, &[Value]) -> String + Send + Sync;

/// A message for one field/rule combination
#[derive(Clone)]
pub enum MessageTemplate {
    /// Interpolated text
    Text(String),
    /// Called with `(field, rule, args)`
    Callback(Arc<MessageFn>),
}

impl fmt::Debug for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl MessageTemplate {
    /// Produce the final message for a concrete field
    pub fn render(&self, field: &str, rule: &str, args: &[Value]) -> String {
        match self {
            Self::Text(text) => interpolate(text, field, rule, args),
            Self::Callback(callback) => callback(field, rule, args),
        }
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MessageTemplate {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Message used when no template matches
pub fn default_message(field: &str, rule: &str) -> String {
    format!("{} validation failed on {}", rule, field)
}

fn interpolate(text: &str, field: &str, rule: &str, args: &[Value]) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match name {
                "field" => field.to_string(),
                "validation" => rule.to_string(),
                _ => name
                    .strip_prefix("argument.")
                    .and_then(|index| index.parse::<usize>().ok())
                    .and_then(|index| args.get(index))
                    .map(|arg| match arg {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

/// Message templates keyed by `field.rule` or `rule`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct Messages {
    entries: HashMap<String, MessageTemplate>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text template
    pub fn with(mut self, key: impl Into<String>, template: impl Into<MessageTemplate>) -> Self {
        self.entries.insert(key.into(), template.into());
        self
    }

    /// Add a callback template
    pub fn with_callback<F>(mut self, key: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str, &str, &[Value]) -> String + Send + Sync + 'static,
    {
        self.entries
            .insert(key.into(), MessageTemplate::Callback(Arc::new(callback)));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<MessageTemplate>) {
        self.entries.insert(key.into(), template.into());
    }

    pub fn get(&self, key: &str) -> Option<&MessageTemplate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Template for a schema field pattern and rule, `field.rule` first
    pub fn resolve(&self, pattern: &str, rule: &str) -> Option<&MessageTemplate> {
        self.entries
            .get(&format!("{}.{}", pattern, rule))
            .or_else(|| self.entries.get(rule))
    }

    /// Resolve and render, falling back to [`default_message`]
    pub fn message_for(&self, pattern: &str, field: &str, rule: &str, args: &[Value]) -> String {
        match self.resolve(pattern, rule) {
            Some(template) => template.render(field, rule, args),
            None => default_message(field, rule),
        }
    }
}

impl From<HashMap<String, String>> for Messages {
    fn from(map: HashMap<String, String>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, text)| (key, MessageTemplate::Text(text)))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Messages
where
    K: Into<String>,
    V: Into<MessageTemplate>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, template)| (key.into(), template.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_message() {
        let messages = Messages::new();
        assert_eq!(
            messages.message_for("username", "username", "required", &[]),
            "required validation failed on username"
        );
    }

    #[test]
    fn test_field_specific_key_wins() {
        let messages = Messages::new()
            .with("required", "{{ field }} is missing")
            .with("email.required", "Enter an email");

        assert_eq!(
            messages.message_for("email", "email", "required", &[]),
            "Enter an email"
        );
        assert_eq!(
            messages.message_for("age", "age", "required", &[]),
            "age is missing"
        );
    }

    #[test]
    fn test_wildcard_pattern_key() {
        let messages = Messages::new().with("users.*.email.email", "Bad email at {{field}}");
        assert_eq!(
            messages.message_for("users.*.email", "users.3.email", "email", &[]),
            "Bad email at users.3.email"
        );
    }

    #[test]
    fn test_argument_interpolation() {
        let messages = Messages::new().with("above", "{{ field }} must be above {{ argument.0 }}");
        assert_eq!(
            messages.message_for("age", "age", "above", &[json!(4)]),
            "age must be above 4"
        );

        let unknown = Messages::new().with("above", "{{ argument.3 }} / {{ other }}");
        assert_eq!(
            unknown.message_for("age", "age", "above", &[json!(4)]),
            "{{ argument.3 }} / {{ other }}"
        );
    }

    #[test]
    fn test_callback_template() {
        let messages = Messages::new().with_callback("min", |field, rule, args| {
            format!("{}:{}:{}", field, rule, args.len())
        });
        assert_eq!(messages.message_for("name", "name", "min", &[json!(3)]), "name:min:1");
    }

    #[test]
    fn test_deserialize_from_map() {
        let messages: Messages =
            serde_json::from_value(json!({"required": "{{ field }} is required"})).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages.get("required"), Some(MessageTemplate::Text(_))));
    }
}
