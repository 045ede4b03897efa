//! Azure Resource Manager adapters: find templates, parse them with line positions, and adapt
//! them into the canonical state.
//!
//! This crate does filesystem IO. Parsing of individual files runs in parallel; results always
//! come back in sorted path order.

#![forbid(unsafe_code)]

mod adapt;
mod discover;
mod parse;
mod spans;

use anyhow::Context;
use camino::Utf8Path;
use globset::GlobSet;
use iacguard_rego::{PolicyEngine, RegoInterpreter, RegoOptions};
use iacguard_rules::RuleCatalog;
use iacguard_scan::{Scanner, ScannerOption, TemplateParser};
use iacguard_types::{ScanContext, SourcePath};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, trace};

pub use adapt::ArmAdapter;
pub use discover::{build_globset, discover_templates};
pub use parse::{ArmDeployment, DEPLOYMENT_SCHEMA_MARKER, Resource, parse_template};
pub use spans::{Node, NodeKind};

/// The full ARM pipeline: template parser, state adapter and Rego policies.
pub type ArmScanner = Scanner<ArmParser, ArmAdapter, RegoInterpreter>;

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
pub mod fuzz {
    use super::*;

    /// Parse arbitrary text as a template file.
    ///
    /// Returns `Ok(...)` on valid JSON, `Err(...)` otherwise. **Never panics** on any input.
    pub fn parse_template(text: &str) -> anyhow::Result<()> {
        let path = SourcePath::new("fuzz.json");
        if let Some(deployment) = parse::parse_template(&path, text)? {
            let _ = iacguard_scan::StateAdapter::adapt(&ArmAdapter, &ScanContext::new(), &deployment);
        }
        Ok(())
    }

    /// Build the positioned tree for arbitrary text that `serde_json` accepts.
    pub fn locate(text: &str) -> anyhow::Result<()> {
        serde_json::from_str::<serde_json::Value>(text)?;
        let _ = spans::parse(text)?;
        Ok(())
    }
}

/// Template parser for ARM JSON deployment templates.
#[derive(Clone, Debug, Default)]
pub struct ArmParser {
    exclude: Option<GlobSet>,
}

impl ArmParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip files whose path relative to the scanned root matches any of `patterns`.
    pub fn with_exclude(patterns: &[String]) -> anyhow::Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }
        let set = build_globset(patterns).context("compile exclude globset")?;
        Ok(Self { exclude: Some(set) })
    }
}

impl TemplateParser for ArmParser {
    type Deployment = ArmDeployment;

    fn name(&self) -> &'static str {
        "azure-arm"
    }

    fn parse_fs(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        dir: &str,
    ) -> anyhow::Result<Vec<ArmDeployment>> {
        let files = discover_templates(fs_root, dir, self.exclude.as_ref())
            .context("discover templates")?;
        debug!(files = files.len(), %dir, "discovered template candidates");

        let parsed: Vec<anyhow::Result<Option<ArmDeployment>>> = files
            .par_iter()
            .map(|rel| {
                ctx.check()?;
                let abs = fs_root.join(rel.as_str());
                let text =
                    std::fs::read_to_string(&abs).with_context(|| format!("read {abs}"))?;
                parse::parse_template(rel, &text)
            })
            .collect();

        ctx.check()?;
        let mut out = Vec::new();
        for (rel, result) in files.iter().zip(parsed) {
            match result? {
                Some(deployment) => out.push(deployment),
                None => trace!(path = %rel, "not a deployment template"),
            }
        }
        Ok(out)
    }
}

/// Wire an ARM scanner around `catalog`. Policies load lazily from `rego` on first scan.
pub fn new_scanner<O>(
    parser: ArmParser,
    catalog: Arc<RuleCatalog>,
    rego: RegoOptions,
    options: O,
) -> ArmScanner
where
    O: IntoIterator<Item = ScannerOption>,
{
    let policy = PolicyEngine::new(move || RegoInterpreter::new(rego.clone()));
    Scanner::new(parser, ArmAdapter, catalog, policy, options)
}
