//! Property-based tests for compiled validators
//!
//! These tests check the relations between traversal modes across a wide
//! range of records and schemas.

use proptest::prelude::*;
use serde_json::{Map, Value};
use vouch_schemas::{
    Compiler, ExecOptions, FormatterFactory, Messages, RuleCompiler, SchemaInput, TraversalMode,
};

/// Strategy for generating scalar field values, absent values included
fn field_value_strategy() -> impl Strategy<Value = Option<Value>> {
    proptest::option::of(prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(|n| Value::Number(n.into())),
        "[a-z@.]{0,12}".prop_map(Value::String),
    ])
}

/// Strategy for generating rule strings from the built-in registry
fn rules_strategy() -> impl Strategy<Value = String> {
    let rule = prop_oneof![
        Just("required"),
        Just("string"),
        Just("number"),
        Just("email"),
        Just("alpha"),
        Just("above:4"),
        Just("under:10"),
        Just("min:3"),
        Just("ends_with:.com"),
    ];
    proptest::collection::vec(rule, 1..5).prop_map(|rules| rules.join("|"))
}

/// Strategy for a schema and a record over the same fields
fn case_strategy() -> impl Strategy<Value = (Value, Value)> {
    proptest::collection::vec((rules_strategy(), field_value_strategy()), 1..6).prop_map(|fields| {
        let mut schema = Map::new();
        let mut data = Map::new();
        for (index, (rules, value)) in fields.into_iter().enumerate() {
            let name = format!("field_{}", index);
            schema.insert(name.clone(), Value::String(rules));
            if let Some(value) = value {
                data.insert(name, value);
            }
        }
        (Value::Object(schema), Value::Object(data))
    })
}

fn error_count(schema: &Value, data: &Value, mode: TraversalMode) -> usize {
    let compiled = RuleCompiler::default()
        .compile(&SchemaInput::try_from(schema.clone()).unwrap(), &Messages::new())
        .unwrap();
    match compiled.exec(
        data,
        FormatterFactory::vanilla().build(),
        &ExecOptions::default(),
        mode,
        None,
    ) {
        Ok(_) => 0,
        Err(errors) => errors.len(),
    }
}

proptest! {
    #[test]
    fn prop_mode_error_counts_are_ordered((schema, data) in case_strategy()) {
        let first = error_count(&schema, &data, TraversalMode::StopAtFirst);
        let each = error_count(&schema, &data, TraversalMode::StopPerField);
        let all = error_count(&schema, &data, TraversalMode::CollectAll);

        prop_assert!(first <= 1);
        prop_assert!(first <= each);
        prop_assert!(each <= all);
        prop_assert_eq!(first == 0, all == 0);
        prop_assert_eq!(each == 0, all == 0);
    }

    #[test]
    fn prop_stop_per_field_reports_one_error_per_field((schema, data) in case_strategy()) {
        let compiled = RuleCompiler::default()
            .compile(&SchemaInput::try_from(schema.clone()).unwrap(), &Messages::new())
            .unwrap();
        if let Err(errors) = compiled.exec(
            &data,
            FormatterFactory::vanilla().build(),
            &ExecOptions::default(),
            TraversalMode::StopPerField,
            None,
        ) {
            prop_assert_eq!(errors.fields().len(), errors.len());
        }
    }

    #[test]
    fn prop_valid_data_round_trips((schema, data) in case_strategy()) {
        let compiled = RuleCompiler::default()
            .compile(&SchemaInput::try_from(schema.clone()).unwrap(), &Messages::new())
            .unwrap();
        if let Ok(output) = compiled.exec(
            &data,
            FormatterFactory::vanilla().build(),
            &ExecOptions::default(),
            TraversalMode::CollectAll,
            None,
        ) {
            prop_assert_eq!(output, data);
        }
    }
}
