use crate::test_support::*;
use crate::{FsScanner, ScanError, with_frameworks, with_include_deprecated_checks, with_rego_only};
use camino::Utf8Path;
use iacguard_rules::RuleCatalog;
use iacguard_types::{Cancelled, Framework, ScanContext, ScanResult, Status};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const ROOT: &str = "/fixtures";

fn root() -> &'static Utf8Path {
    Utf8Path::new(ROOT)
}

fn ids(results: &[ScanResult]) -> Vec<&str> {
    results.iter().map(|r| r.rule_id.as_str()).collect()
}

#[test]
fn empty_catalog_and_bundle_yield_nothing() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(FakeParser::with(&["main.json"]), RuleCatalog::new(), &spy, vec![]);

    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert!(out.is_empty());
    assert_eq!(spy.loads.load(Ordering::SeqCst), 1);
    assert_eq!(spy.evaluations.load(Ordering::SeqCst), 1);
}

#[test]
fn one_rule_one_deployment_one_result() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(
        FakeParser::with(&["main.json"]),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );

    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(ids(&out), vec!["R1"]);
    assert_eq!(out[0].status, Status::Failed);
}

#[test]
fn deprecated_rules_are_skipped_unless_included() {
    let spy = Arc::new(PolicySpy::default());
    let rules = || catalog(vec![failing_rule("R1").deprecated(true), failing_rule("R2")]);

    let default = scanner(FakeParser::with(&["main.json"]), rules(), &spy, vec![]);
    let out = default
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(ids(&out), vec!["R2"]);

    let included = scanner(
        FakeParser::with(&["main.json"]),
        rules(),
        &spy,
        vec![with_include_deprecated_checks(true)],
    );
    let out = included
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(ids(&out), vec!["R1", "R2"]);
}

#[test]
fn policy_load_failure_aborts_then_retries() {
    let spy = Arc::new(PolicySpy::default());
    spy.fail_load.store(true, Ordering::SeqCst);
    let scanner = scanner(
        FakeParser::with(&["main.json"]),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );

    let err = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect_err("load fails");
    assert!(matches!(err, ScanError::PolicyLoad(_)), "{err}");
    assert!(!scanner.policy().is_loaded());

    spy.fail_load.store(false, Ordering::SeqCst);
    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("retry succeeds");
    assert_eq!(ids(&out), vec!["R1"]);
    assert_eq!(spy.loads.load(Ordering::SeqCst), 2);
}

#[test]
fn frameworks_select_rules() {
    let spy = Arc::new(PolicySpy::default());
    let rules = catalog(vec![
        failing_rule("R1"),
        tagged(failing_rule("R2"), &[Framework::CIS_AZURE_1_3]),
        tagged(
            failing_rule("R3"),
            &[Framework::DEFAULT, Framework::CIS_AZURE_1_3],
        ),
    ]);
    let scanner = scanner(
        FakeParser::with(&["main.json"]),
        rules,
        &spy,
        vec![with_frameworks([Framework::CIS_AZURE_1_3])],
    );
    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(ids(&out), vec!["R2", "R3"]);
}

#[test]
fn rego_only_never_runs_structural_rules() {
    let spy = Arc::new(PolicySpy::default());
    *spy.deny_id.lock().expect("lock") = Some("USR-1".to_string());
    let calls = Arc::new(AtomicUsize::new(0));
    let scanner = scanner(
        FakeParser::with(&["a.json", "b.json"]),
        catalog(vec![panicking_rule("R1", &calls)]),
        &spy,
        vec![with_rego_only(true)],
    );

    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(ids(&out), vec!["USR-1", "USR-1"]);
}

#[test]
fn panicking_rule_becomes_ignored_result_and_scan_continues() {
    let spy = Arc::new(PolicySpy::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let scanner = scanner(
        FakeParser::with(&["main.json"]),
        catalog(vec![panicking_rule("R0", &calls), failing_rule("R1")]),
        &spy,
        vec![],
    );

    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(ids(&out), vec!["R0", "R1"]);
    assert_eq!(out[0].status, Status::Ignored);
    assert!(out[0].description.contains("rule exploded"));
}

#[test]
fn structural_findings_precede_policy_findings_per_deployment() {
    let spy = Arc::new(PolicySpy::default());
    *spy.deny_id.lock().expect("lock") = Some("USR-1".to_string());
    let scanner = scanner(
        FakeParser::with(&["a.json", "b.json"]),
        catalog(vec![failing_rule("R1"), failing_rule("R2")]),
        &spy,
        vec![],
    );
    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert_eq!(ids(&out), vec!["R1", "R2", "USR-1", "R1", "R2", "USR-1"]);
    let policy_paths: Vec<&str> = out
        .iter()
        .filter(|r| r.rule_id == "USR-1")
        .filter_map(|r| r.range.as_ref().map(|range| range.filename.as_str()))
        .collect();
    assert_eq!(policy_paths, vec!["a.json", "b.json"]);
}

#[test]
fn cancelled_before_scan_returns_error_without_parsing() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(
        FakeParser::with(&["main.json"]),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );
    let ctx = ScanContext::new();
    ctx.cancel();

    let err = scanner.scan_fs(&ctx, root(), ".").expect_err("cancelled");
    assert!(matches!(err, ScanError::Cancelled(Cancelled::Canceled)));
    assert_eq!(scanner.parser().calls.load(Ordering::SeqCst), 0);
    assert_eq!(spy.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn expired_deadline_is_reported_as_deadline_exceeded() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(FakeParser::with(&["main.json"]), RuleCatalog::new(), &spy, vec![]);
    let ctx = ScanContext::with_timeout(std::time::Duration::ZERO);

    let err = scanner.scan_fs(&ctx, root(), ".").expect_err("deadline");
    assert!(matches!(err, ScanError::Cancelled(Cancelled::DeadlineExceeded)));
}

#[test]
fn cancellation_mid_deployment_discards_partial_results() {
    let spy = Arc::new(PolicySpy::default());
    let ctx = ScanContext::new();
    let scanner = scanner(
        FakeParser::with(&["a.json", "b.json"]),
        catalog(vec![
            failing_rule("R1"),
            cancelling_rule("R2", &ctx),
            failing_rule("R3"),
        ]),
        &spy,
        vec![],
    );

    let err = scanner.scan_fs(&ctx, root(), ".").expect_err("cancelled");
    assert!(err.is_cancelled());
    assert_eq!(spy.evaluations.load(Ordering::SeqCst), 0);
}

#[test]
fn repeated_scans_are_identical() {
    let spy = Arc::new(PolicySpy::default());
    *spy.deny_id.lock().expect("lock") = Some("USR-1".to_string());
    let scanner = scanner(
        FakeParser::with(&["a.json", "b.json"]),
        catalog(vec![failing_rule("R1"), failing_rule("R2")]),
        &spy,
        vec![],
    );
    let first = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("first");
    let second = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("second");
    assert_eq!(first, second);
    assert_eq!(spy.loads.load(Ordering::SeqCst), 1);
}

#[test]
fn parser_error_is_surfaced_verbatim() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(
        FakeParser::failing("main.json: expected value at line 3 column 5"),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );
    let err = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect_err("parse");
    assert!(matches!(err, ScanError::Parse(_)));
    assert_eq!(err.to_string(), "main.json: expected value at line 3 column 5");
    assert_eq!(spy.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn policy_evaluation_error_names_the_deployment() {
    let spy = Arc::new(PolicySpy::default());
    spy.fail_eval.store(true, Ordering::SeqCst);
    let scanner = scanner(
        FakeParser::with(&["nested/main.json"]),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );
    let err = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect_err("eval fails");
    assert!(
        err.to_string().starts_with("rego scan error in nested/main.json"),
        "{err}"
    );
}

#[test]
fn no_deployments_still_loads_policies() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(
        FakeParser::with(&[]),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );
    let out = scanner
        .scan_fs(&ScanContext::new(), root(), ".")
        .expect("scan");
    assert!(out.is_empty());
    assert!(scanner.policy().is_loaded());
}

#[test]
fn concurrent_scans_share_one_policy_load() {
    let spy = Arc::new(PolicySpy::default());
    let scanner = scanner(
        FakeParser::with(&["a.json"]),
        catalog(vec![failing_rule("R1")]),
        &spy,
        vec![],
    );
    let scanner: &dyn FsScanner = &scanner;

    let counts: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                s.spawn(|| {
                    scanner
                        .scan_fs(&ScanContext::new(), root(), ".")
                        .expect("scan")
                        .len()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert!(counts.iter().all(|n| *n == 1));
    assert_eq!(spy.loads.load(Ordering::SeqCst), 1);
    assert_eq!(scanner.name(), "fake");
}
