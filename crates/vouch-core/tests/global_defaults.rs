//! Process-wide defaults through the free functions
//!
//! Kept in its own test binary with a single test: `configure` mutates
//! state shared by every test in the process.

use serde_json::json;
use vouch_core::{
    configure, defaults, factory_defaults, reset_defaults, validate, validate_each,
    ErrorCollector, PartialConfig, RawSchema,
};

#[test]
fn test_configure_applies_to_later_calls_and_resets() {
    let schema = || RawSchema::new().field("username", "required").field("age", "required");

    configure(&PartialConfig::new().custom_error_collector(ErrorCollector::new(
        |formatter, _messages, field, rule, args| {
            formatter.add_error(&format!("{} is invalid", field), field, rule, args);
        },
    )));
    configure(&PartialConfig::new().remove_additional(true));

    let current = defaults();
    assert!(current.custom_error_collector.is_some());
    assert!(current.remove_additional);
    assert!(factory_defaults().custom_error_collector.is_none());
    assert!(!factory_defaults().remove_additional);

    let err = validate_each(&json!({}), schema(), None, None).unwrap_err();
    let messages: Vec<String> = err
        .validation_errors()
        .unwrap()
        .entries()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(messages, vec!["username is invalid", "age is invalid"]);

    let output = validate(
        &json!({"username": "virk", "age": 30, "admin": true}),
        schema(),
        None,
        None,
    )
    .unwrap();
    assert_eq!(output, json!({"username": "virk", "age": 30}));

    // Call-site overrides win over configured defaults
    let err = validate(&json!({}), schema(), None, Some(&PartialConfig::new().no_error_collector()))
        .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().entries()[0].message,
        "required validation failed on username"
    );

    reset_defaults();
    assert!(defaults().custom_error_collector.is_none());
    let output = validate(&json!({"username": "virk", "age": 30, "admin": true}), schema(), None, None)
        .unwrap();
    assert_eq!(output["admin"], json!(true));
}
