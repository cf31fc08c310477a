//! Compiled validator execution
//!
//! One traversal serves every mode: fields run in declaration order,
//! depth first (a node's own rules, then its children, array elements in
//! index order), rules in declared order. [`TraversalMode`] only decides
//! what happens after a failing rule.
//!
//! Copyright (c) 2025 Vouch Team
//! Licensed under the Apache-2.0 license

use crate::compiler::{join_path, CompiledKind, CompiledNode, CompiledRule, CompiledValidator};
use crate::error::ValidationErrors;
use crate::formatter::{ErrorCollector, ErrorFormatter};
use crate::messages::{default_message, Messages};
use crate::rules::{is_existy, RuleContext};
use serde_json::{Map, Value};
use tracing::{debug_span, trace};

/// What to do after a rule fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Abort the whole run at the first failure
    #[default]
    StopAtFirst,
    /// Run every rule on every field
    CollectAll,
    /// Skip the remaining rules of a failing field, continue with the next field
    StopPerField,
}

impl TraversalMode {
    /// Global stop flag
    pub fn stop_on_first_error(self) -> bool {
        matches!(self, Self::StopAtFirst)
    }

    /// Per-field stop flag
    pub fn stop_on_first_field_error(self) -> bool {
        matches!(self, Self::StopPerField)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StopAtFirst => "stop_at_first",
            Self::CollectAll => "collect_all",
            Self::StopPerField => "stop_per_field",
        }
    }
}

/// Execution flags taken from the effective configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Strip undeclared fields from the returned data
    pub remove_additional: bool,
    /// Treat empty strings as present for non-presence rules
    pub existy_strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Halt,
}

struct Execution<'a> {
    root: &'a Value,
    formatter: Box<dyn ErrorFormatter>,
    messages: &'a Messages,
    options: &'a ExecOptions,
    mode: TraversalMode,
    collector: Option<&'a ErrorCollector>,
}

impl<'a> Execution<'a> {
    fn run_fields(
        &mut self,
        fields: &'a [(String, CompiledNode)],
        prefix: Option<&str>,
        container: Option<&'a Value>,
    ) -> Flow {
        for (key, node) in fields {
            let field = join_path(prefix, key);
            let value = container.and_then(|c| c.get(key.as_str()));
            if self.run_node(node, &field, key, value, container) == Flow::Halt {
                return Flow::Halt;
            }
        }
        Flow::Continue
    }

    fn run_node(
        &mut self,
        node: &'a CompiledNode,
        field: &str,
        key: &str,
        value: Option<&'a Value>,
        parent: Option<&'a Value>,
    ) -> Flow {
        let present = is_existy(value, self.options.existy_strict);

        for rule in &node.rules {
            if !present && !rule.rule.runs_on_absent() {
                trace!(field, rule = %rule.name, "Skipping rule for absent value");
                continue;
            }

            let ctx = RuleContext {
                value,
                args: &rule.args,
                field,
                key,
                parent,
                root: self.root,
            };
            if rule.rule.validate(&ctx) {
                continue;
            }

            trace!(field, rule = %rule.name, "Rule failed");
            self.report(rule, field);
            match self.mode {
                TraversalMode::StopAtFirst => return Flow::Halt,
                TraversalMode::StopPerField => break,
                TraversalMode::CollectAll => {}
            }
        }

        match &node.kind {
            CompiledKind::Literal | CompiledKind::Array(None) => Flow::Continue,
            CompiledKind::Object(children) => self.run_fields(children, Some(field), value),
            CompiledKind::Array(Some(each)) => {
                let Some(Value::Array(items)) = value else {
                    return Flow::Continue;
                };
                for (index, item) in items.iter().enumerate() {
                    let index = index.to_string();
                    let item_field = join_path(Some(field), &index);
                    if self.run_node(each, &item_field, &index, Some(item), value) == Flow::Halt {
                        return Flow::Halt;
                    }
                }
                Flow::Continue
            }
        }
    }

    fn report(&mut self, rule: &CompiledRule, field: &str) {
        match self.collector {
            Some(collector) => collector.collect(
                self.formatter.as_mut(),
                self.messages,
                field,
                &rule.name,
                &rule.args,
            ),
            None => {
                let message = match &rule.message {
                    Some(template) => template.render(field, &rule.name, &rule.args),
                    None => default_message(field, &rule.name),
                };
                self.formatter
                    .add_error(&message, field, &rule.name, &rule.args);
            }
        }
    }
}

impl CompiledValidator {
    /// Run the validator against `data`.
    ///
    /// Returns the validated data (stripped of undeclared fields when
    /// `remove_additional` is set) or the formatter's ordered entries.
    pub fn exec(
        &self,
        data: &Value,
        formatter: Box<dyn ErrorFormatter>,
        options: &ExecOptions,
        mode: TraversalMode,
        collector: Option<&ErrorCollector>,
    ) -> Result<Value, ValidationErrors> {
        let _span = debug_span!("exec", mode = mode.as_str()).entered();

        let mut execution = Execution {
            root: data,
            formatter,
            messages: &self.messages,
            options,
            mode,
            collector,
        };
        execution.run_fields(&self.fields, None, Some(data));

        match execution.formatter.to_errors() {
            Some(errors) if !errors.is_empty() => Err(ValidationErrors::new(errors)),
            _ if options.remove_additional => Ok(strip_fields(&self.fields, data)),
            _ => Ok(data.clone()),
        }
    }
}

fn strip_fields(fields: &[(String, CompiledNode)], data: &Value) -> Value {
    let Value::Object(map) = data else {
        return data.clone();
    };

    let mut out = Map::new();
    for (key, node) in fields {
        if let Some(value) = map.get(key) {
            out.insert(key.clone(), strip_node(node, value));
        }
    }
    Value::Object(out)
}

fn strip_node(node: &CompiledNode, value: &Value) -> Value {
    match (&node.kind, value) {
        (CompiledKind::Object(children), Value::Object(_)) => strip_fields(children, value),
        (CompiledKind::Array(Some(each)), Value::Array(items)) => {
            Value::Array(items.iter().map(|item| strip_node(each, item)).collect())
        }
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, RuleCompiler, SchemaInput};
    use crate::formatter::VanillaFormatter;
    use serde_json::json;

    fn compiled(schema: Value) -> CompiledValidator {
        RuleCompiler::default()
            .compile(&SchemaInput::try_from(schema).unwrap(), &Messages::new())
            .unwrap()
    }

    fn run(validator: &CompiledValidator, data: Value, mode: TraversalMode) -> Result<Value, ValidationErrors> {
        validator.exec(
            &data,
            Box::new(VanillaFormatter::new()),
            &ExecOptions::default(),
            mode,
            None,
        )
    }

    #[test]
    fn test_mode_flags() {
        assert!(TraversalMode::StopAtFirst.stop_on_first_error());
        assert!(!TraversalMode::CollectAll.stop_on_first_error());
        assert!(!TraversalMode::CollectAll.stop_on_first_field_error());
        assert!(TraversalMode::StopPerField.stop_on_first_field_error());
    }

    #[test]
    fn test_collect_all_runs_every_rule() {
        let validator = compiled(json!({"email": "required|email|ends_with:.com"}));
        let errors = run(&validator, json!({"email": "@yahoo.uk"}), TraversalMode::CollectAll)
            .unwrap_err();
        let rules: Vec<String> = errors.entries().into_iter().map(|e| e.validation).collect();
        assert_eq!(rules, vec!["email", "ends_with"]);
    }

    #[test]
    fn test_stop_per_field_skips_remaining_rules() {
        let validator = compiled(json!({"email": "required|email|ends_with:.com"}));
        let errors = run(&validator, json!({"email": "@yahoo.uk"}), TraversalMode::StopPerField)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.entries()[0].validation, "email");
    }

    #[test]
    fn test_absent_values_skip_non_presence_rules() {
        let validator = compiled(json!({"nickname": "string|min:3"}));
        assert!(run(&validator, json!({}), TraversalMode::CollectAll).is_ok());
        assert!(run(&validator, json!({"nickname": null}), TraversalMode::CollectAll).is_ok());
        assert!(run(&validator, json!({"nickname": "ab"}), TraversalMode::CollectAll).is_err());
    }

    #[test]
    fn test_existy_strict_checks_empty_strings() {
        let validator = compiled(json!({"nickname": "min:3"}));
        let data = json!({"nickname": ""});
        assert!(run(&validator, data.clone(), TraversalMode::CollectAll).is_ok());

        let strict = ExecOptions {
            existy_strict: true,
            ..ExecOptions::default()
        };
        let result = validator.exec(
            &data,
            Box::new(VanillaFormatter::new()),
            &strict,
            TraversalMode::CollectAll,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_array_elements_use_concrete_paths() {
        let validator = compiled(json!({
            "users": "required|array",
            "users.*.email": "required|email",
        }));
        let data = json!({"users": [{"email": "a@b.com"}, {"email": "nope"}, {}]});
        let errors = run(&validator, data, TraversalMode::CollectAll).unwrap_err();
        let fields: Vec<String> = errors.entries().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["users.1.email", "users.2.email"]);
        assert_eq!(
            errors.entries()[0].message,
            "email validation failed on users.1.email"
        );
    }

    #[test]
    fn test_nested_children_run_when_parent_missing() {
        let validator = compiled(json!({
            "profile": "required|object",
            "profile.name": "required",
        }));
        let errors = run(&validator, json!({}), TraversalMode::CollectAll).unwrap_err();
        assert_eq!(errors.fields(), vec!["profile", "profile.name"]);
    }

    #[test]
    fn test_remove_additional_strips_undeclared_fields() {
        let validator = compiled(json!({
            "username": "required",
            "profile.age": "number",
            "tags.*.label": "string",
        }));
        let data = json!({
            "username": "virk",
            "is_admin": true,
            "profile": {"age": 30, "secret": "x"},
            "tags": [{"label": "a", "color": "red"}],
        });
        let options = ExecOptions {
            remove_additional: true,
            ..ExecOptions::default()
        };

        let output = validator
            .exec(
                &data,
                Box::new(VanillaFormatter::new()),
                &options,
                TraversalMode::CollectAll,
                None,
            )
            .unwrap();
        assert_eq!(
            output,
            json!({
                "username": "virk",
                "profile": {"age": 30},
                "tags": [{"label": "a"}],
            })
        );

        let untouched = run(&validator, data.clone(), TraversalMode::CollectAll).unwrap();
        assert_eq!(untouched, data);
    }

    #[test]
    fn test_collector_owns_messages() {
        let validator = compiled(json!({"username": "required", "age": "required"}));
        let collector = ErrorCollector::new(|formatter, _messages, field, rule, args| {
            formatter.add_error("Validation failed", field, rule, args);
        });
        let errors = validator
            .exec(
                &json!({}),
                Box::new(VanillaFormatter::new()),
                &ExecOptions::default(),
                TraversalMode::CollectAll,
                Some(&collector),
            )
            .unwrap_err();
        assert!(errors.entries().iter().all(|e| e.message == "Validation failed"));
        assert_eq!(errors.len(), 2);
    }
}
