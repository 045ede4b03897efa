use crate::{
    ConfigurableScanner, Deployment, ScanError, ScannerConfig, ScannerOption, StateAdapter,
    TemplateParser,
};
use camino::Utf8Path;
use iacguard_rego::{Input, PolicyEngine, PolicyInterpreter};
use iacguard_rules::{Rule, RuleCatalog};
use iacguard_types::{Framework, ScanContext, ScanResult};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Object-safe scanning entry point.
pub trait FsScanner: Send + Sync {
    fn name(&self) -> &'static str;

    fn scan_fs(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        dir: &str,
    ) -> Result<Vec<ScanResult>, ScanError>;
}

/// Runs the rule catalog and the policy engine over every deployment a parser finds.
///
/// Configuration is fixed once construction ends: setters need `&mut self`, scans take `&self`.
pub struct Scanner<P, A, I> {
    parser: P,
    adapter: A,
    catalog: Arc<RuleCatalog>,
    policy: PolicyEngine<I>,
    config: ScannerConfig,
}

impl<P, A, I> Scanner<P, A, I>
where
    P: TemplateParser,
    A: StateAdapter<P::Deployment>,
    I: PolicyInterpreter,
{
    pub fn new<O>(
        parser: P,
        adapter: A,
        catalog: Arc<RuleCatalog>,
        policy: PolicyEngine<I>,
        options: O,
    ) -> Self
    where
        O: IntoIterator<Item = ScannerOption>,
    {
        let mut scanner = Self {
            parser,
            adapter,
            catalog,
            policy,
            config: ScannerConfig::default(),
        };
        for option in options {
            option.apply(&mut scanner);
        }
        scanner
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn policy(&self) -> &PolicyEngine<I> {
        &self.policy
    }

    /// Rules selected by the configured frameworks, before deprecation filtering.
    pub fn selected_rules(&self) -> Vec<&Rule> {
        self.catalog.get_registered(&self.config.frameworks)
    }

    /// Parse `dir` under `fs_root` and scan every deployment found.
    ///
    /// Any error discards all results gathered so far.
    pub fn scan_fs(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        dir: &str,
    ) -> Result<Vec<ScanResult>, ScanError> {
        ctx.check()?;

        let deployments = self
            .parser
            .parse_fs(ctx, fs_root, dir)
            .map_err(ScanError::from_parse)
            .inspect_err(|err| warn!(parser = self.parser.name(), %dir, error = %err, "parse failed"))?;
        debug!(
            parser = self.parser.name(),
            %dir,
            deployments = deployments.len(),
            "parsed deployments"
        );

        self.scan_deployments(ctx, fs_root, &deployments)
    }

    /// Scan already-parsed deployments. Loads the policy bundle from `fs_root` if needed.
    pub fn scan_deployments(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        deployments: &[P::Deployment],
    ) -> Result<Vec<ScanResult>, ScanError> {
        self.policy
            .ensure_loaded(fs_root)
            .map_err(ScanError::PolicyLoad)?;

        let rules = self.selected_rules();
        let mut results = Vec::new();
        for deployment in deployments {
            let found = self
                .scan_deployment(ctx, fs_root, &rules, deployment)
                .inspect_err(|err| {
                    warn!(path = %deployment.source_path(), error = %err, "scan aborted")
                })?;
            results.extend(found);
        }
        Ok(results)
    }

    fn scan_deployment(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        rules: &[&Rule],
        deployment: &P::Deployment,
    ) -> Result<Vec<ScanResult>, ScanError> {
        let path = deployment.source_path();
        let state = self.adapter.adapt(ctx, deployment);

        let mut results = Vec::new();
        if !self.config.rego_only {
            for rule in rules {
                ctx.check()?;
                if rule.deprecated && !self.config.include_deprecated_checks {
                    trace!(rule = %rule.id, "skipping deprecated rule");
                    continue;
                }
                results.extend(rule.evaluate(&state));
            }
        }
        let structural = results.len();

        ctx.check()?;
        let contents = state.to_rego();
        let input = Input {
            path,
            fs: fs_root,
            contents: &contents,
        };
        let policy = self
            .policy
            .scan_input(ctx, &input)
            .map_err(|err| ScanError::from_policy(path, err))?;
        debug!(
            %path,
            structural,
            policy = policy.len(),
            "deployment scanned"
        );
        results.extend(policy);
        Ok(results)
    }
}

impl<P, A, I> ConfigurableScanner for Scanner<P, A, I> {
    fn set_frameworks(&mut self, frameworks: Vec<Framework>) {
        self.config.set_frameworks(frameworks);
    }

    fn set_rego_only(&mut self, rego_only: bool) {
        self.config.set_rego_only(rego_only);
    }

    fn set_include_deprecated_checks(&mut self, include: bool) {
        self.config.set_include_deprecated_checks(include);
    }
}

impl<P, A, I> FsScanner for Scanner<P, A, I>
where
    P: TemplateParser + Send + Sync,
    A: StateAdapter<P::Deployment> + Send + Sync,
    I: PolicyInterpreter,
{
    fn name(&self) -> &'static str {
        self.parser.name()
    }

    fn scan_fs(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        dir: &str,
    ) -> Result<Vec<ScanResult>, ScanError> {
        Scanner::scan_fs(self, ctx, fs_root, dir)
    }
}
