use crate::model::{IacguardConfigV1, SCHEMA_CONFIG_V1};
use anyhow::Context;
use camino::Utf8PathBuf;
use globset::Glob;
use iacguard_rego::{DEFAULT_NAMESPACES, RegoOptions};
use iacguard_scan::{
    ScannerOption, with_frameworks, with_include_deprecated_checks, with_rego_only,
};
use iacguard_types::Framework;
use std::time::Duration;

/// Command-line values. Anything set here wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub frameworks: Vec<String>,
    pub rego_only: Option<bool>,
    pub include_deprecated_checks: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub policy_dirs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub frameworks: Vec<Framework>,
    pub rego_only: bool,
    pub include_deprecated_checks: bool,
    pub timeout: Option<Duration>,
    pub exclude: Vec<String>,
    pub policy_dirs: Vec<Utf8PathBuf>,
    pub namespaces: Vec<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            frameworks: vec![Framework::DEFAULT],
            rego_only: false,
            include_deprecated_checks: false,
            timeout: None,
            exclude: Vec::new(),
            policy_dirs: Vec::new(),
            namespaces: DEFAULT_NAMESPACES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ResolvedConfig {
    /// Scanner options, applied in this order.
    pub fn scanner_options(&self) -> Vec<ScannerOption> {
        vec![
            with_frameworks(self.frameworks.clone()),
            with_rego_only(self.rego_only),
            with_include_deprecated_checks(self.include_deprecated_checks),
        ]
    }

    pub fn rego_options(&self) -> RegoOptions {
        self.policy_dirs
            .iter()
            .fold(RegoOptions::default(), |opts, dir| opts.with_policy_dir(dir.clone()))
            .with_namespaces(self.namespaces.iter().cloned())
    }
}

pub fn resolve_config(
    cfg: IacguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema: {schema} (expected {SCHEMA_CONFIG_V1})");
    }

    let mut resolved = ResolvedConfig::default();

    let frameworks = if overrides.frameworks.is_empty() {
        cfg.frameworks
    } else {
        overrides.frameworks
    };
    if !frameworks.is_empty() {
        resolved.frameworks = frameworks
            .iter()
            .map(|f| parse_framework(f))
            .collect::<anyhow::Result<_>>()?;
    }

    resolved.rego_only = overrides.rego_only.or(cfg.rego_only).unwrap_or(false);
    resolved.include_deprecated_checks = overrides
        .include_deprecated_checks
        .or(cfg.include_deprecated_checks)
        .unwrap_or(false);

    // Zero means no deadline.
    resolved.timeout = overrides
        .timeout_secs
        .or(cfg.timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    validate_globs(&cfg.exclude)?;
    resolved.exclude = cfg.exclude;

    let dirs = if overrides.policy_dirs.is_empty() {
        cfg.policies.dirs
    } else {
        overrides.policy_dirs
    };
    resolved.policy_dirs = dirs
        .into_iter()
        .map(|d| {
            if d.trim().is_empty() {
                anyhow::bail!("policy directory must not be empty");
            }
            Ok(Utf8PathBuf::from(d))
        })
        .collect::<anyhow::Result<_>>()?;

    if !cfg.policies.namespaces.is_empty() {
        for ns in &cfg.policies.namespaces {
            validate_namespace(ns)?;
        }
        resolved.namespaces = cfg.policies.namespaces;
    }

    Ok(resolved)
}

fn parse_framework(v: &str) -> anyhow::Result<Framework> {
    let name = v.trim().to_ascii_lowercase();
    if name.is_empty() {
        anyhow::bail!("framework name must not be empty");
    }
    Ok(match name.as_str() {
        "default" => Framework::DEFAULT,
        "all" => Framework::ALL,
        "cis-azure-1.3" => Framework::CIS_AZURE_1_3,
        _ => Framework::new(name),
    })
}

fn validate_globs(patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid exclude glob: {pattern}"))?;
    }
    Ok(())
}

fn validate_namespace(ns: &str) -> anyhow::Result<()> {
    let valid = !ns.is_empty()
        && ns
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        anyhow::bail!("invalid policy namespace: {ns:?} (expected a single Rego identifier)");
    }
    Ok(())
}
