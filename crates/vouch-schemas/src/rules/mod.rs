//! Rule registry
//!
//! Rules are looked up by name at compile time. The compiler never inspects
//! rule internals beyond the [`Rule`] trait.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

pub mod builtin;

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Everything a rule can see while checking one value
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Value under validation, `None` when the field is missing
    pub value: Option<&'a Value>,
    /// Arguments returned by [`Rule::compile`]
    pub args: &'a [Value],
    /// Concrete field path (`users.0.email`)
    pub field: &'a str,
    /// Last segment of the field path
    pub key: &'a str,
    /// Object or array holding the value
    pub parent: Option<&'a Value>,
    /// Whole data record
    pub root: &'a Value,
}

impl<'a> RuleContext<'a> {
    /// Argument at `index`
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// Value of a sibling field in the same parent object
    pub fn sibling(&self, key: &str) -> Option<&'a Value> {
        self.parent.and_then(|parent| parent.get(key))
    }
}

/// A named validation rule
pub trait Rule: Send + Sync {
    /// Name used in schemas and error entries
    fn name(&self) -> &'static str;

    /// Check and normalize arguments once, at compile time
    fn compile(&self, args: Vec<Value>) -> Result<Vec<Value>, String> {
        Ok(args)
    }

    /// Returns `true` when the value satisfies the rule
    fn validate(&self, ctx: &RuleContext<'_>) -> bool;

    /// Presence rules run even when the value is absent; every other rule
    /// is skipped for absent values.
    fn runs_on_absent(&self) -> bool {
        false
    }
}

/// Named rules available to the compiler
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<&'static str, Arc<dyn Rule>>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}

impl RuleRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in rule
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Add or replace a rule
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> &mut Self {
        self.rules.insert(rule.name(), Arc::new(rule));
        self
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Sorted rule names
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Value presence as seen by non-presence rules.
///
/// Missing and `null` values are absent. Empty strings are absent as well
/// unless `strict` is set.
pub fn is_existy(value: Option<&Value>, strict: bool) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) if !strict => !s.is_empty(),
        Some(_) => true,
    }
}

/// Numeric view of a value: numbers and numeric strings
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        _ => None,
    }
}

/// Textual view of a scalar value
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct AlwaysFails;

    impl Rule for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn validate(&self, _ctx: &RuleContext<'_>) -> bool {
            false
        }
    }

    #[test]
    fn test_register_custom_rule() {
        let mut registry = RuleRegistry::builtin();
        let before = registry.len();
        registry.register(AlwaysFails);

        assert_eq!(registry.len(), before + 1);
        assert!(registry.contains("always_fails"));
        assert!(registry.get("always_fails").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_builtin_names_sorted() {
        let names = RuleRegistry::builtin().names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"required"));
        assert!(names.contains(&"ends_with"));
    }

    #[test]
    fn test_is_existy() {
        assert!(!is_existy(None, false));
        assert!(!is_existy(Some(&json!(null)), true));
        assert!(!is_existy(Some(&json!("")), false));
        assert!(is_existy(Some(&json!("")), true));
        assert!(is_existy(Some(&json!(0)), false));
        assert!(is_existy(Some(&json!(false)), false));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(4)), Some(4.0));
        assert_eq!(as_number(&json!(" 4.5 ")), Some(4.5));
        assert_eq!(as_number(&json!("4dd")), None);
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!(true)), None);
    }
}
