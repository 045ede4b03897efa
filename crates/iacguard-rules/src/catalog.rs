use crate::checks;
use crate::rule::Rule;
use iacguard_types::Framework;
use tracing::warn;

/// Append-only registry of structural rules.
///
/// Filled at startup and shared read-only by scanners afterwards; retrieval order is always
/// registration order so result ordering is reproducible.
#[derive(Clone, Debug, Default)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every builtin rule compiled into this build.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        checks::register_builtin(&mut catalog);
        catalog
    }

    /// Add a rule. A rule without frameworks joins [`Framework::DEFAULT`]; a second rule with an
    /// already-registered id is ignored.
    pub fn register(&mut self, mut rule: Rule) {
        if self.get(&rule.id).is_some() {
            warn!(rule = %rule.id, "rule already registered; ignoring duplicate");
            return;
        }
        if rule.frameworks.is_empty() {
            rule.frameworks.push(Framework::DEFAULT);
        }
        self.rules.push(rule);
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rules whose framework set intersects `frameworks`, in registration order.
    ///
    /// An empty selection, or one containing [`Framework::ALL`], selects every rule.
    pub fn get_registered(&self, frameworks: &[Framework]) -> Vec<&Rule> {
        if frameworks.is_empty() || frameworks.contains(&Framework::ALL) {
            return self.rules.iter().collect();
        }
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(frameworks))
            .collect()
    }
}
