//! Integration tests for the formflow CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a formflow command isolated from user config and environment
fn formflow() -> Command {
    let mut cmd = Command::cargo_bin("formflow").unwrap();
    cmd.env_remove("FORMFLOW_FORMAT")
        .env_remove("FORMFLOW_FLOWS_DIR")
        .env_remove("FORMFLOW_LOG")
        .env("HOME", "/nonexistent-formflow-home")
        .env("XDG_CONFIG_HOME", "/nonexistent-formflow-home/.config");
    cmd
}

/// Helper to write an answers file into a temp directory
fn write_answers(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const VALID_MULTISTEP: &str = r#"
name: Alice
email: alice@example.com
country: SE
postalCode: "12345"
text: Nothing else to add
"#;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    formflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("forms"));
}

#[test]
fn test_version_displays() {
    formflow()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("formflow"));
}

#[test]
fn test_unknown_command_fails() {
    formflow()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    formflow()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("formflow"));
}

// ============================================================================
// Flows Command Tests
// ============================================================================

#[test]
fn test_flows_list() {
    formflow()
        .args(["flows", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("multistep"))
        .stdout(predicate::str::contains("single"));
}

#[test]
fn test_flows_show() {
    formflow()
        .args(["flows", "show", "multistep"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 2"))
        .stdout(predicate::str::contains("postalCode"))
        .stdout(predicate::str::contains("enum [US, UK, SE]"));
}

#[test]
fn test_flows_show_raw_is_json() {
    let output = formflow()
        .args(["flows", "show", "single", "--raw"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let docs: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["properties"]["text"]["minLength"], 50);
    assert_eq!(docs[0]["properties"]["pet"]["enum"], json!(["DOG", "CAT", "IDK"]));
}

#[test]
fn test_flows_show_unknown_fails() {
    formflow()
        .args(["flows", "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown flow"));
}

#[test]
fn test_flows_dir_adds_flow() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("survey.yaml"),
        r#"
name: survey
title: Quick survey
steps:
  - fields:
      - name: rating
        type: enum
        values: ["1", "2", "3"]
"#,
    )
    .unwrap();

    formflow()
        .args(["flows", "list", "--flows-dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("survey"));
}

// ============================================================================
// Check Command Tests
// ============================================================================

#[test]
fn test_check_valid_multistep() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(&tmp, "answers.yaml", VALID_MULTISTEP);

    formflow()
        .arg("check")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1 accepted"))
        .stdout(predicate::str::contains("Step 2 accepted"))
        .stdout(predicate::str::contains("\"postalCode\": \"12345\""));
}

#[test]
fn test_check_quiet_prints_only_data() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(&tmp, "answers.yaml", VALID_MULTISTEP);

    let output = formflow()
        .args(["check", "--quiet"])
        .arg(&answers)
        .output()
        .unwrap();
    assert!(output.status.success());

    let data: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        data,
        json!({
            "name": "Alice",
            "email": "alice@example.com",
            "country": "SE",
            "postalCode": "12345",
            "text": "Nothing else to add"
        })
    );
}

#[test]
fn test_check_yaml_format() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(&tmp, "answers.yaml", VALID_MULTISTEP);

    let output = formflow()
        .args(["check", "--quiet", "--format", "yaml"])
        .arg(&answers)
        .output()
        .unwrap();
    assert!(output.status.success());

    let data: Value = serde_yml::from_slice(&output.stdout).unwrap();
    assert_eq!(data["country"], "SE");
    assert_eq!(data["postalCode"], "12345");
}

#[test]
fn test_check_format_from_env() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(&tmp, "answers.yaml", VALID_MULTISTEP);

    formflow()
        .env("FORMFLOW_FORMAT", "yaml")
        .args(["check", "--quiet"])
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("country: SE"));
}

#[test]
fn test_check_rejects_short_name() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(
        &tmp,
        "answers.yaml",
        "name: Al\nemail: a@b.com\ncountry: SE\npostalCode: '12345'\ntext: hi\n",
    );

    formflow()
        .arg("check")
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step 1 rejected"))
        .stderr(predicate::str::contains("Name: Too short"))
        .stderr(predicate::str::contains("Email").not());
}

#[test]
fn test_check_reports_every_invalid_field() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(
        &tmp,
        "answers.yaml",
        "name: Alice\nemail: a@b.com\ncountry: DE\npostalCode: '1'\n",
    );

    formflow()
        .arg("check")
        .arg(&answers)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Step 1 accepted"))
        .stderr(predicate::str::contains("Step 2 rejected: 2 field(s)"))
        .stderr(predicate::str::contains("Country: Invalid value 'DE'"))
        .stderr(predicate::str::contains("Postal code: Too short"));
}

#[test]
fn test_check_rejects_email_without_dotted_domain() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(
        &tmp,
        "answers.yaml",
        "name: Alice\nemail: alice@localhost\ncountry: SE\npostalCode: '12345'\n",
    );

    formflow()
        .args(["check", "--flow", "multistep"])
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step 1 rejected: 1 field(s)"))
        .stderr(predicate::str::contains("Email: Invalid email"));
}

#[test]
fn test_check_single_flow_text_minimum() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(
        &tmp,
        "answers.json",
        r#"{"name": "Alice", "email": "a@b.com", "text": "too short"}"#,
    );

    formflow()
        .args(["check", "--flow", "single"])
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Text: Too short"));
}

#[test]
fn test_check_single_flow_uses_pet_default() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(
        &tmp,
        "answers.yaml",
        "name: Alice\nemail: a@b.com\ntext: This text is comfortably longer than fifty characters in total.\n",
    );

    let output = formflow()
        .args(["check", "--quiet", "-n", "single"])
        .arg(&answers)
        .output()
        .unwrap();
    assert!(output.status.success());

    let data: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(data["pet"], "DOG");
}

#[test]
fn test_check_warns_on_unknown_keys() {
    let tmp = TempDir::new().unwrap();
    let answers = write_answers(
        &tmp,
        "answers.yaml",
        &format!("{}\nfavouriteColour: blue\n", VALID_MULTISTEP),
    );

    formflow()
        .arg("check")
        .arg(&answers)
        .assert()
        .success()
        .stderr(predicate::str::contains("'favouriteColour' is not a field"))
        .stdout(predicate::str::contains("favouriteColour").not());
}

#[test]
fn test_check_with_flow_file() {
    let tmp = TempDir::new().unwrap();
    let flow = write_answers(
        &tmp,
        "contact.yaml",
        r#"
name: contact
title: Contact
steps:
  - fields:
      - name: email
        type: string
        format: email
  - fields:
      - name: topic
        type: enum
        values: [sales, support]
"#,
    );
    let answers = write_answers(&tmp, "answers.yaml", "email: a@b.com\ntopic: support\n");

    let output = formflow()
        .args(["check", "--quiet", "--file"])
        .arg(&flow)
        .arg(&answers)
        .output()
        .unwrap();
    assert!(output.status.success());

    let data: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(data, json!({"email": "a@b.com", "topic": "support"}));
}

#[test]
fn test_check_invalid_flow_file_fails() {
    let tmp = TempDir::new().unwrap();
    let flow = write_answers(
        &tmp,
        "dup.yaml",
        r#"
name: dup
title: Dup
steps:
  - fields:
      - name: email
        type: string
  - fields:
      - name: email
        type: string
"#,
    );
    let answers = write_answers(&tmp, "answers.yaml", "email: a@b.com\n");

    formflow()
        .args(["check", "--file"])
        .arg(&flow)
        .arg(&answers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("appears in step 1 and step 2"));
}

#[test]
fn test_check_missing_answers_file_fails() {
    formflow()
        .args(["check", "/nonexistent/answers.yaml"])
        .assert()
        .failure();
}
