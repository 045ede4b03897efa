use iacguard_rules::RuleCatalog;
use iacguard_types::{Framework, Severity};
use serde::Serialize;

/// Catalog entry as shown by `iacguard rules`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: String,
    pub summary: String,
    pub severity: Severity,
    pub frameworks: Vec<Framework>,
    pub deprecated: bool,
}

/// Rules a scan with the same settings would run, in registration order.
pub fn list_rules(
    catalog: &RuleCatalog,
    frameworks: &[Framework],
    include_deprecated: bool,
) -> Vec<RuleInfo> {
    catalog
        .get_registered(frameworks)
        .into_iter()
        .filter(|rule| include_deprecated || !rule.deprecated)
        .map(|rule| RuleInfo {
            id: rule.id.clone(),
            summary: rule.summary.clone(),
            severity: rule.severity,
            frameworks: rule.frameworks.clone(),
            deprecated: rule.deprecated,
        })
        .collect()
}
