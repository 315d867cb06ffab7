//! Integration tests for the cfgmap binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PROFILE_TOML: &str = r#"
display_name = "production"

[[rule]]
severity_level = "ERROR"
delay_in_minutes = 5
include_mode = "INCLUDE_ANY"

[[rule.tag_filter]]
context = "CONTEXTLESS"
key = "env"
value = "prod"
"#;

/// Get a Command for the cfgmap binary
fn cfgmap_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cfgmap").expect("Failed to find cfgmap binary");
    cmd.env_remove("CFGMAP_CONFIG")
        .env_remove("CFGMAP_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    cfgmap_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("encode"))
        .stdout(predicate::str::contains("push"));
}

#[test]
fn test_no_command_prints_hint() {
    cfgmap_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("cfgmap --help"));
}

#[test]
fn test_kinds_lists_every_kind() {
    cfgmap_cmd()
        .arg("kinds")
        .assert()
        .success()
        .stdout(predicate::str::contains("alerting_profile"))
        .stdout(predicate::str::contains("host_anomaly_detection"))
        .stdout(predicate::str::contains("metric_threshold"))
        .stdout(predicate::str::contains("span_capture_rule"));
}

#[test]
fn test_schema_describes_attributes() {
    cfgmap_cmd()
        .args(["schema", "alerting_profile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("display_name"))
        .stdout(predicate::str::contains("tag_filter"));
}

#[test]
fn test_unknown_kind_fails() {
    cfgmap_cmd()
        .args(["schema", "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dashboard"));
}

#[test]
fn test_decode_prints_wire_json() {
    let dir = TempDir::new().unwrap();
    let tree = write(&dir, "profile.toml", PROFILE_TOML);

    let output = cfgmap_cmd()
        .args(["decode", "alerting_profile"])
        .arg(&tree)
        .output()
        .unwrap();
    assert!(output.status.success());

    let wire: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(wire["displayName"], "production");
    assert_eq!(wire["rules"][0]["severityLevel"], "ERROR");
    assert_eq!(wire["rules"][0]["tagFilter"]["includeMode"], "INCLUDE_ANY");
    assert_eq!(wire["rules"][0]["tagFilter"]["tagFilters"][0]["key"], "env");
}

#[test]
fn test_decode_reports_schema_violation() {
    let dir = TempDir::new().unwrap();
    let tree = write(&dir, "profile.toml", "management_zone_id = 7\n");

    cfgmap_cmd()
        .args(["decode", "alerting_profile"])
        .arg(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("display_name"));
}

#[test]
fn test_encode_renders_toml() {
    let dir = TempDir::new().unwrap();
    let wire = write(
        &dir,
        "profile.json",
        r#"{"id":"p-1","displayName":"production","rules":[]}"#,
    );

    cfgmap_cmd()
        .args(["encode", "alerting_profile"])
        .arg(&wire)
        .assert()
        .success()
        .stdout(predicate::str::contains("display_name = \"production\""))
        .stdout(predicate::str::contains("id = \"p-1\""));
}

#[test]
fn test_encode_from_stdin_to_yaml_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("threshold.yaml");

    cfgmap_cmd()
        .args(["encode", "metric_threshold", "-", "--output"])
        .arg(&output)
        .write_stdin(
            r#"{"name":"cpu","enabled":true,"metricId":"builtin:host.cpu","alertCondition":"ABOVE",
                "threshold":90.0,"samples":5,"violatingSamples":3,"dealertingSamples":5}"#,
        )
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("metric_id:"));
    assert!(written.contains("builtin:host.cpu"));
}

#[test]
fn test_encode_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let wire = write(&dir, "broken.json", "{ not json");

    cfgmap_cmd()
        .args(["encode", "span_capture_rule"])
        .arg(&wire)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed wire document"));
}

#[test]
fn test_push_without_base_url_fails() {
    let dir = TempDir::new().unwrap();
    let tree = write(&dir, "profile.toml", PROFILE_TOML);

    cfgmap_cmd()
        .args(["push", "alerting_profile"])
        .arg(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url is not set"));
}

#[test]
fn test_push_singleton_rejected() {
    let dir = TempDir::new().unwrap();
    let tree = write(&dir, "host.toml", "");

    cfgmap_cmd()
        .args(["push", "host_anomaly_detection"])
        .arg(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be pushed"));
}
