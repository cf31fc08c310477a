//! End-to-end tests for the `vouch` binary

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = "username: required\nemail: required|email\nage: number|above:17\n";

/// Workspace with a schema file and an isolated home directory
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("schema.yaml"), SCHEMA).unwrap();
    dir
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn vouch(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vouch"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("VOUCH_CONFIG")
        .env_remove("VOUCH_LOG_FORMAT")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_valid_file_passes() {
    let dir = workspace();
    write(dir.path(), "ok.json", r#"{"username": "virk", "email": "virk@adonisjs.com", "age": 30}"#);

    let output = vouch(dir.path(), &["--no-color", "validate", "ok.json", "--schema", "schema.yaml"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("✓ ok.json"));
    assert!(text.contains("All 1 file(s) passed"));
}

#[test]
fn test_collect_all_reports_every_failure() {
    let dir = workspace();
    write(dir.path(), "bad.json", r#"{"email": "nope", "age": 12}"#);

    let output = vouch(
        dir.path(),
        &["--no-color", "validate", "bad.json", "--schema", "schema.yaml", "--mode", "all"],
    );

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("✗ bad.json (3 error(s))"));
    assert!(text.contains("username │ required │ required validation failed on username"));
    assert!(text.contains("email    │ email    │ email validation failed on email"));
    assert!(text.contains("age      │ above    │ above validation failed on age"));
    assert!(stderr(&output).contains("Error: 1 of 1 file(s) failed validation"));
}

#[test]
fn test_json_output_per_mode() {
    let dir = workspace();
    write(dir.path(), "bad.yaml", "email: nope\nage: 12\n");
    write(dir.path(), "ok.yaml", "username: virk\nemail: virk@adonisjs.com\n");

    let run = |mode: &str| -> Vec<Value> {
        let output = vouch(
            dir.path(),
            &[
                "-o", "json", "validate", "bad.yaml", "ok.yaml", "--schema", "schema.yaml", "--mode", mode,
            ],
        );
        assert_eq!(output.status.code(), Some(1));
        serde_json::from_slice::<Value>(&output.stdout).unwrap().as_array().unwrap().clone()
    };

    let first = run("first");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["valid"], false);
    assert_eq!(first[0]["errors"].as_array().unwrap().len(), 1);
    assert_eq!(first[0]["errors"][0]["field"], "username");
    assert_eq!(first[1]["valid"], true);
    assert!(first[1].get("errors").is_none());

    let each = run("each");
    let fields: Vec<&str> = each[0]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["username", "email", "age"]);
}

#[test]
fn test_custom_messages_and_jsonapi_formatter() {
    let dir = workspace();
    write(dir.path(), "bad.json", r#"{"username": "virk", "email": "nope"}"#);
    write(dir.path(), "messages.yaml", "email.email: \"Enter a valid email address\"\n");

    let output = vouch(
        dir.path(),
        &[
            "-o", "json", "validate", "bad.json", "--schema", "schema.yaml", "--messages",
            "messages.yaml", "--formatter", "jsonapi",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        reports[0]["errors"][0],
        serde_json::json!({
            "title": "email",
            "detail": "Enter a valid email address",
            "source": {"pointer": "email"}
        })
    );
}

#[test]
fn test_show_data_with_remove_additional() {
    let dir = workspace();
    write(dir.path(), "ok.json", r#"{"username": "virk", "email": "virk@adonisjs.com", "admin": true}"#);

    let output = vouch(
        dir.path(),
        &[
            "-o", "json", "validate", "ok.json", "--schema", "schema.yaml", "--show-data",
            "--remove-additional",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        reports[0]["data"],
        serde_json::json!({"username": "virk", "email": "virk@adonisjs.com"})
    );
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = workspace();
    write(dir.path(), ".vouch.yaml", "defaults:\n  mode: all\n  formatter: jsonapi\n");
    write(dir.path(), "bad.json", "{}");

    let output = vouch(dir.path(), &["-o", "json", "validate", "bad.json", "--schema", "schema.yaml"]);

    assert_eq!(output.status.code(), Some(1));
    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    let errors = reports[0]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["title"], "required");
    assert_eq!(errors[1]["source"]["pointer"], "email");
}

#[test]
fn test_unknown_rule_is_a_schema_error() {
    let dir = workspace();
    write(dir.path(), "broken.yaml", "email: required|shiny\n");
    write(dir.path(), "data.json", "{}");

    let output = vouch(dir.path(), &["--no-color", "validate", "data.json", "--schema", "broken.yaml"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown rule 'shiny' on field 'email'"));
}

#[test]
fn test_missing_data_file() {
    let dir = workspace();

    let output = vouch(dir.path(), &["--no-color", "validate", "absent.json", "--schema", "schema.yaml"]);

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("File not found: absent.json"));
}

#[test]
fn test_check_lists_fields() {
    let dir = workspace();

    let output = vouch(dir.path(), &["--no-color", "check", "schema.yaml", "--detailed"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("✓ Schema compiled: 3 field(s), 5 rule(s)"));
    assert!(text.contains("age      │ number|above:17"));
}

#[test]
fn test_config_init_then_show() {
    let dir = workspace();

    let output = vouch(dir.path(), &["--no-color", "config", "init", "custom.yaml"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(dir.path().join("custom.yaml").exists());

    let again = vouch(dir.path(), &["config", "init", "custom.yaml"]);
    assert_eq!(again.status.code(), Some(5));

    let show = vouch(dir.path(), &["--config", "custom.yaml", "config", "show", "--format", "json"]);
    assert_eq!(show.status.code(), Some(0));
    let shown: Value = serde_json::from_slice(&show.stdout).unwrap();
    assert_eq!(shown["defaults"]["mode"], "first");
    assert_eq!(shown["defaults"]["formatter"], "vanilla");
}

#[test]
fn test_completions() {
    let dir = workspace();

    let output = vouch(dir.path(), &["completions", "bash"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("vouch"));
}
