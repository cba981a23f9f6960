//! Integration tests for the `metamodel` binary.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from any user configuration.
fn metamodel() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("metamodel");
    cmd.env_remove("RUST_LOG")
        .env_remove("METAMODEL_VALIDATION__MODE")
        .env("NO_COLOR", "1");
    cmd
}

/// Manifest directory holding one class with an orphaned support method,
/// plus a config file that loads only that directory.
fn broken_domain() -> TempDir {
    let temp = TempDir::new().unwrap();
    let classes = temp.path().join("classes");
    fs::create_dir(&classes).unwrap();
    fs::write(
        classes.join("broken.toml"),
        r#"
            [[class]]
            name = "shop.Broken"

            [[class.method]]
            name = "defaultAnInt"
            type = "int"
        "#,
    )
    .unwrap();
    fs::write(
        temp.path().join("metamodel.toml"),
        "[classes]\ndirectory = \"classes\"\nbuiltin = false\n",
    )
    .unwrap();
    temp
}

fn config_in(dir: &Path) -> String {
    dir.join("metamodel.toml").display().to_string()
}

// ── basics ───────────────────────────────────────────────────────────────────

#[test]
fn help_lists_commands() {
    metamodel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("identifier"));
}

#[test]
fn version_flag() {
    metamodel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn quiet_and_verbose_conflict() {
    metamodel().args(["-q", "-v", "list"]).assert().code(2);
}

// ── list / inspect ───────────────────────────────────────────────────────────

#[test]
fn list_shows_builtin_classes() {
    metamodel()
        .args(["list", "--format", "names"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.Customer"))
        .stdout(predicate::str::contains("com.acme.Customer_placeOrder"));
}

#[test]
fn list_json_after_introspection() {
    let output = metamodel()
        .args(["--output-format", "json", "list", "--introspect"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let classes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let classes = classes.as_array().unwrap();
    assert!(!classes.is_empty());
    assert!(classes.iter().all(|c| c["state"] == "introspected"));
}

#[test]
fn inspect_shows_contributed_action() {
    metamodel()
        .args(["inspect", "com.acme.Customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("placeOrder"))
        .stdout(predicate::str::contains("Members ("));
}

#[test]
fn inspect_json() {
    let output = metamodel()
        .args(["inspect", "com.acme.Order", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["class_name"], "com.acme.Order");
    assert!(summary["members"].as_array().unwrap().iter().any(|m| m["id"] == "cancel"));
}

#[test]
fn inspect_unknown_class_is_not_found() {
    metamodel()
        .args(["inspect", "com.acme.Ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("com.acme.Ghost"))
        .stderr(predicate::str::contains("Suggestions"));
}

// ── validate ─────────────────────────────────────────────────────────────────

#[test]
fn builtin_domain_is_valid_in_production() {
    metamodel()
        .args(["validate", "--mode", "production"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Metamodel is valid"));
}

#[test]
fn broken_domain_is_reported_in_prototype() {
    let temp = broken_domain();
    metamodel()
        .args(["--config", &config_in(temp.path()), "validate", "--mode", "prototype"])
        .assert()
        .success()
        .stdout(predicate::str::contains("defaultAnInt"))
        .stdout(predicate::str::contains("1 error(s)"));
}

#[test]
fn broken_domain_aborts_in_production() {
    let temp = broken_domain();
    metamodel()
        .args(["--config", &config_in(temp.path()), "validate", "--mode", "production"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("defaultAnInt"))
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn environment_selects_the_mode() {
    let temp = broken_domain();
    metamodel()
        .env("METAMODEL_VALIDATION__MODE", "production")
        .args(["--config", &config_in(temp.path()), "validate"])
        .assert()
        .code(5);
}

// ── configuration ────────────────────────────────────────────────────────────

#[test]
fn missing_config_file_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    metamodel()
        .args(["--config", &config_in(temp.path()), "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn invalid_policy_is_rejected_before_introspection() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("metamodel.toml"),
        "[introspection]\nencapsulation = \"encapsulated\"\n",
    )
    .unwrap();

    metamodel()
        .args(["--config", &config_in(temp.path()), "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("encapsulation"));
}

#[test]
fn config_get_reads_file_values() {
    let temp = broken_domain();
    metamodel()
        .args(["--config", &config_in(temp.path()), "config", "get", "classes.builtin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("classes.builtin = false"));
}

#[test]
fn config_get_unknown_key() {
    metamodel()
        .args(["config", "get", "nope.nothing"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown config key"));
}

// ── identifier / completions ─────────────────────────────────────────────────

#[test]
fn identifier_parts_are_shown() {
    metamodel()
        .args(["identifier", "com.acme.Order#cancel(string)[0]"])
        .assert()
        .success()
        .stdout(predicate::str::contains("parameter"))
        .stdout(predicate::str::contains("com.acme.Order"));
}

#[test]
fn malformed_identifier_is_a_user_error() {
    metamodel()
        .args(["identifier", "com.acme.Order#cancel(string"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unbalanced parentheses"));
}

#[test]
fn completions_for_bash() {
    metamodel()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metamodel"));
}
