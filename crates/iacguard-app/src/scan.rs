//! The `scan` use case: resolve settings, scan templates, produce a report.

use anyhow::Context;
use camino::Utf8Path;
use iacguard_arm::{ArmParser, new_scanner};
use iacguard_rules::RuleCatalog;
use iacguard_settings::{IacguardConfigV1, Overrides, ResolvedConfig};
use iacguard_types::{SCHEMA_REPORT_V1, ScanContext, ScanReport, StatusCounts, ToolMeta};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

/// Input for the scan use case.
#[derive(Clone, Debug)]
pub struct ScanInput<'a> {
    /// Root of the scanned filesystem. Report paths and relative policy dirs resolve against it.
    pub fs_root: &'a Utf8Path,
    /// Directory under `fs_root` to scan (`.` for all of it).
    pub dir: &'a str,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    pub overrides: Overrides,
}

#[derive(Clone, Debug)]
pub struct ScanOutput {
    pub report: ScanReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

pub fn run_scan(input: ScanInput<'_>) -> anyhow::Result<ScanOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Empty config is allowed, defaults apply.
    let cfg = if input.config_text.trim().is_empty() {
        IacguardConfigV1::default()
    } else {
        iacguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved = iacguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let parser = ArmParser::with_exclude(&resolved.exclude).context("build template parser")?;
    let scanner = new_scanner(
        parser,
        Arc::new(RuleCatalog::builtin()),
        resolved.rego_options(),
        resolved.scanner_options(),
    );
    let ctx = match resolved.timeout {
        Some(timeout) => ScanContext::with_timeout(timeout),
        None => ScanContext::new(),
    };

    info!(
        root = %input.fs_root,
        dir = input.dir,
        frameworks = ?resolved.frameworks,
        rego_only = resolved.rego_only,
        "scanning"
    );
    let results = scanner
        .scan_fs(&ctx, input.fs_root, input.dir)
        .with_context(|| format!("scan {}", input.fs_root.join(input.dir)))?;

    let summary = StatusCounts::from_results(&results);
    info!(
        passed = summary.passed,
        failed = summary.failed,
        ignored = summary.ignored,
        "scan finished"
    );

    let report = ScanReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "iacguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        summary,
        results,
    };

    Ok(ScanOutput {
        report,
        resolved_config: resolved,
    })
}

/// Map a report to a process exit code: 0 = clean, 2 = failed results.
pub fn exit_code(report: &ScanReport) -> i32 {
    if report.has_failures() { 2 } else { 0 }
}
