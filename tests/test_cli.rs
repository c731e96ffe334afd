use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_search-form")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("SEARCH_FORM_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("command should run")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected JSON on stdout ({}):\n{}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn test_validate_valid_state() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    write_file(&state, "{text: 'foo', datatypes: ['Image']}");

    let output = run(&["validate", state.to_str().expect("utf8 path")]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("All sections valid."));
}

#[test]
fn test_validate_invalid_state_exits_with_failure() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    write_file(
        &state,
        "{datatypes: [], timeRange: {type: 'DURING', from: '2020-02-01', to: '2020-01-01', applyTo: ['created']}}",
    );

    let output = run(&["-F", "json", "validate", state.to_str().expect("utf8 path")]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        json!({
            "valid": false,
            "errors": {
                "datatypes": {"datatypes": "Must choose at least one type to match against"},
                "timeRange": {
                    "timeRangeErrors": {
                        "from": "'From' date must be before 'To' date",
                        "to": "'To' date must be after 'From' date"
                    },
                    "attributeSelectorErrors": {}
                }
            }
        })
    );
}

#[test]
fn test_tree_prints_filter_tree_json() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    write_file(&state, "{text: 'foo', sources: ['cache']}");

    let output = run(&["-F", "json", "tree", state.to_str().expect("utf8 path")]);

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({
            "type": "AND",
            "filters": [{"type": "ILIKE", "property": "anyText", "value": "foo"}]
        })
    );
}

#[test]
fn test_tree_text_output() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    write_file(&state, "{}");

    let output = run(&["tree", state.to_str().expect("utf8 path")]);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "AND\n  anyText ILIKE \"*\"\n"
    );
}

#[test]
fn test_build_uses_given_ids_and_config() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    let config = dir.path().join("form.toml");
    write_file(&state, "{location: 'POINT(1 2)'}");
    write_file(&config, "[sections]\nsources = ['local']\n");

    let output = run(&[
        "-c",
        config.to_str().expect("utf8 path"),
        "build",
        state.to_str().expect("utf8 path"),
        "--id",
        "req-1",
        "--batch-id",
        "batch-1",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let request = stdout_json(&output);
    assert_eq!(request["id"], json!("req-1"));
    assert_eq!(request["batchId"], json!("batch-1"));
    assert_eq!(request["srcs"], json!(["local"]));
    assert_eq!(request["count"], json!(250));
    assert_eq!(
        request["filterTree"]["filters"][0],
        json!({"type": "INTERSECTS", "property": "anyGeo", "value": "POINT(1 2)"})
    );
}

#[test]
fn test_build_blocked_by_errors() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    write_file(&state, "{sources: []}");

    let output = run(&["build", state.to_str().expect("utf8 path")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Must choose at least one source"));
}

#[test]
fn test_parse_rebuilds_state() {
    let dir = tempdir().expect("temp dir");
    let tree = dir.path().join("tree.json");
    write_file(
        &tree,
        r#"{"type": "AND", "filters": [
            {"type": "ILIKE", "property": "anyText", "value": "foo"},
            {"type": "OR", "filters": [
                {"type": "EQUALS", "property": "datatype", "value": "Text"}
            ]}
        ]}"#,
    );

    let output = run(&["-F", "json", "parse", tree.to_str().expect("utf8 path")]);

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"text": "foo", "datatypes": ["Text"]})
    );
}

#[test]
fn test_parse_skips_unknown_operators() {
    let dir = tempdir().expect("temp dir");
    let tree = dir.path().join("tree.json5");
    write_file(
        &tree,
        "{type: 'AND', filters: [{type: 'ILIKE', property: 'anyText', value: 'foo'}, {type: 'NEAR', property: 'anyGeo', value: 'POINT(1 2)'}]}",
    );

    let output = run(&["-F", "json", "parse", tree.to_str().expect("utf8 path")]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout_json(&output), json!({"text": "foo"}));
}

#[test]
fn test_unknown_section_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let state = dir.path().join("state.json5");
    write_file(&state, "{colour: 'red'}");

    let output = run(&["validate", state.to_str().expect("utf8 path")]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown section: 'colour'"));
}

#[test]
fn test_missing_file_reports_path() {
    let output = run(&["validate", "/nonexistent/state.json5"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read editor state"));
}
