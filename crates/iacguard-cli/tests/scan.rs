//! End-to-end CLI tests against the ARM fixtures in `tests/fixtures/`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a Command for the iacguard binary.
#[allow(deprecated)]
fn iacguard_cmd() -> Command {
    Command::cargo_bin("iacguard").expect("iacguard binary not found - run `cargo build` first")
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("iacguard-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
}

/// Run `scan` on a fixture, writing the report to a temp file. Returns exit code and report.
fn scan_fixture(fixture: &str, extra: &[&str]) -> (i32, Value) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let report_path = temp_dir.path().join("out/report.json");

    let output = iacguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join(fixture))
        .arg("scan")
        .arg("--report-out")
        .arg(&report_path)
        .args(extra)
        .output()
        .expect("run iacguard");

    let code = output.status.code().unwrap_or(-1);
    let text = std::fs::read_to_string(&report_path).expect("read report");
    (code, serde_json::from_str(&text).expect("parse report json"))
}

fn failed_rule_ids(report: &Value) -> Vec<String> {
    report["results"]
        .as_array()
        .expect("results array")
        .iter()
        .filter(|r| r["status"] == "failed")
        .map(|r| r["rule_id"].as_str().expect("rule_id").to_string())
        .collect()
}

#[test]
fn clean_fixture_passes() {
    let (code, report) = scan_fixture("arm_clean", &[]);
    assert_eq!(code, 0);
    assert_eq!(report["schema"], "iacguard.report.v1");
    assert_eq!(report["tool"]["name"], "iacguard");
    assert_eq!(report["summary"]["failed"], 0);
    assert!(report["summary"]["passed"].as_u64().unwrap_or(0) > 0);
}

#[test]
fn insecure_storage_fails_with_exit_two() {
    let (code, report) = scan_fixture("arm_storage_insecure", &[]);
    assert_eq!(code, 2);
    assert_eq!(
        failed_rule_ids(&report),
        vec!["AZU-0008", "AZU-0011", "AZU-0007"]
    );
    let first = &report["results"]
        .as_array()
        .expect("results")
        .iter()
        .find(|r| r["status"] == "failed")
        .expect("a failure")["range"];
    assert_eq!(first["filename"], "azuredeploy.json");
    assert_eq!(first["start_line"], 12);
}

#[test]
fn framework_flag_narrows_rules() {
    let (code, report) =
        scan_fixture("arm_nsg_open_ssh", &["--framework", "cis-azure-1.3"]);
    assert_eq!(code, 2);
    assert_eq!(failed_rule_ids(&report), vec!["AZU-0050"]);
}

#[test]
fn config_file_loads_user_policies() {
    let (code, report) = scan_fixture("arm_policies", &[]);
    assert_eq!(code, 2);
    assert_eq!(failed_rule_ids(&report), vec!["USR-KV-0001"]);
}

#[test]
fn rego_only_flag_skips_builtin_rules() {
    let (_, report) = scan_fixture("arm_policies", &["--rego-only"]);
    let results = report["results"].as_array().expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["code"], "policy_deny");
}

#[test]
fn report_goes_to_stdout_by_default() {
    iacguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join("arm_clean"))
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"schema\": \"iacguard.report.v1\""));
}

#[test]
fn invalid_template_is_a_runtime_error() {
    iacguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join("arm_broken"))
        .arg("scan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("iacguard error:"))
        .stderr(predicate::str::contains("main.json"));
}

#[test]
fn missing_root_is_a_runtime_error() {
    iacguard_cmd()
        .args(["--root", "does/not/exist", "scan"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("root does not exist"));
}

#[test]
fn rules_lists_the_selection() {
    let output = iacguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join("arm_clean"))
        .arg("rules")
        .output()
        .expect("run iacguard");
    assert!(output.status.success());
    let rules: Value = serde_json::from_slice(&output.stdout).expect("rules json");
    let ids: Vec<&str> = rules
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["id"].as_str().expect("id"))
        .collect();
    assert!(ids.contains(&"AZU-0008"));
    assert!(!ids.contains(&"AZU-0009"));

    iacguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join("arm_clean"))
        .args(["rules", "--include-deprecated"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AZU-0009"));
}
