use crate::{Deployment, Scanner, ScannerOption, StateAdapter, TemplateParser};
use anyhow::anyhow;
use camino::Utf8Path;
use iacguard_rego::{Input, PolicyEngine, PolicyError, PolicyInterpreter};
use iacguard_rules::{Rule, RuleCatalog};
use iacguard_state::{Metadata, State};
use iacguard_types::{Framework, Range, ScanContext, ScanResult, Severity, SourcePath, Status};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub struct FakeDeployment {
    pub path: SourcePath,
    pub range: Range,
}

impl FakeDeployment {
    pub fn new(path: &str) -> Self {
        Self {
            path: SourcePath::new(path),
            range: Range::new(SourcePath::new(path), 1, 40),
        }
    }
}

impl Deployment for FakeDeployment {
    fn source_path(&self) -> &SourcePath {
        &self.path
    }

    fn range(&self) -> &Range {
        &self.range
    }
}

#[derive(Default)]
pub struct FakeParser {
    pub deployments: Vec<FakeDeployment>,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeParser {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            deployments: paths.iter().map(|p| FakeDeployment::new(p)).collect(),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

impl TemplateParser for FakeParser {
    type Deployment = FakeDeployment;

    fn name(&self) -> &'static str {
        "fake"
    }

    fn parse_fs(
        &self,
        ctx: &ScanContext,
        _fs_root: &Utf8Path,
        _dir: &str,
    ) -> anyhow::Result<Vec<FakeDeployment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        match &self.error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(self.deployments.clone()),
        }
    }
}

/// Records each adapted path; the state itself is empty.
#[derive(Default)]
pub struct FakeAdapter {
    pub adapted: Mutex<Vec<SourcePath>>,
}

impl StateAdapter<FakeDeployment> for FakeAdapter {
    fn adapt(&self, _ctx: &ScanContext, deployment: &FakeDeployment) -> State {
        if let Ok(mut seen) = self.adapted.lock() {
            seen.push(deployment.path.clone());
        }
        State::default()
    }
}

/// Shared switches and counters for [`FakeInterpreter`] instances built by one factory.
#[derive(Default)]
pub struct PolicySpy {
    pub loads: AtomicUsize,
    pub evaluations: AtomicUsize,
    pub fail_load: AtomicBool,
    pub fail_eval: AtomicBool,
    /// When set, every evaluation yields one failed result with this id.
    pub deny_id: Mutex<Option<String>>,
}

pub struct FakeInterpreter {
    spy: Arc<PolicySpy>,
}

impl PolicyInterpreter for FakeInterpreter {
    fn load_policies(&mut self, _policy_fs: &Utf8Path) -> Result<(), PolicyError> {
        self.spy.loads.fetch_add(1, Ordering::SeqCst);
        if self.spy.fail_load.load(Ordering::SeqCst) {
            return Err(PolicyError::Compile {
                path: "policies/bad.rego".to_string(),
                message: "rego_parse_error: unexpected eof".to_string(),
            });
        }
        Ok(())
    }

    fn evaluate(&self, ctx: &ScanContext, input: &Input<'_>) -> Result<Vec<ScanResult>, PolicyError> {
        self.spy.evaluations.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        if self.spy.fail_eval.load(Ordering::SeqCst) {
            return Err(PolicyError::Evaluate {
                query: "data.user.x.deny".to_string(),
                message: "boom".to_string(),
            });
        }
        let deny = self.spy.deny_id.lock().map(|g| g.clone()).unwrap_or(None);
        Ok(deny
            .map(|id| {
                vec![result(
                    &id,
                    Status::Failed,
                    Range::new(input.path.clone(), 2, 3),
                )]
            })
            .unwrap_or_default())
    }
}

pub fn policy_engine(spy: &Arc<PolicySpy>) -> PolicyEngine<FakeInterpreter> {
    let spy = Arc::clone(spy);
    PolicyEngine::new(move || FakeInterpreter {
        spy: Arc::clone(&spy),
    })
}

pub type FakeScanner = Scanner<FakeParser, FakeAdapter, FakeInterpreter>;

pub fn scanner(
    parser: FakeParser,
    catalog: RuleCatalog,
    spy: &Arc<PolicySpy>,
    options: Vec<ScannerOption>,
) -> FakeScanner {
    Scanner::new(
        parser,
        FakeAdapter::default(),
        Arc::new(catalog),
        policy_engine(spy),
        options,
    )
}

pub fn result(id: &str, status: Status, range: Range) -> ScanResult {
    ScanResult {
        rule_id: id.to_string(),
        severity: Severity::High,
        status,
        code: "test".to_string(),
        description: format!("{id} finding"),
        range: Some(range),
        resource: None,
        fingerprint: None,
        data: serde_json::Value::Null,
    }
}

/// A rule that fails once per state.
pub fn failing_rule(id: &str) -> Rule {
    let description = format!("{id} violated");
    Rule::new(id, format!("{id} summary"), Severity::High, move |_state, out| {
        let meta = Metadata::new(Range::new(SourcePath::new("fake.json"), 1, 1));
        out.fail("res", description.clone(), &meta);
    })
}

pub fn tagged(rule: Rule, frameworks: &[Framework]) -> Rule {
    rule.with_frameworks(frameworks.iter().cloned())
}

/// Counts its invocations and panics on every one.
pub fn panicking_rule(id: &str, calls: &Arc<AtomicUsize>) -> Rule {
    let calls = Arc::clone(calls);
    Rule::new(id, "always panics", Severity::Low, move |_state, _out| {
        calls.fetch_add(1, Ordering::SeqCst);
        panic!("rule exploded");
    })
}

/// Cancels `ctx` while it runs, then reports a failure.
pub fn cancelling_rule(id: &str, ctx: &ScanContext) -> Rule {
    let ctx = ctx.clone();
    Rule::new(id, "cancels the scan", Severity::Low, move |_state, out| {
        ctx.cancel();
        let meta = Metadata::new(Range::new(SourcePath::new("fake.json"), 1, 1));
        out.fail("res", "late", &meta);
    })
}

pub fn catalog(rules: Vec<Rule>) -> RuleCatalog {
    let mut catalog = RuleCatalog::new();
    for rule in rules {
        catalog.register(rule);
    }
    catalog
}
