use iacguard_state::{Metadata, State};
use iacguard_types::{Framework, ScanResult, Severity, Status, ids};
use serde_json::json;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Signature of a rule's check function.
pub type CheckFn = dyn Fn(&State, &mut Results<'_>) + Send + Sync;

/// A structural security check.
#[derive(Clone)]
pub struct Rule {
    pub id: String,
    pub summary: String,
    pub severity: Severity,
    pub frameworks: Vec<Framework>,
    pub deprecated: bool,
    check: Arc<CheckFn>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("frameworks", &self.frameworks)
            .field("deprecated", &self.deprecated)
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub fn new<F>(id: impl Into<String>, summary: impl Into<String>, severity: Severity, check: F) -> Self
    where
        F: Fn(&State, &mut Results<'_>) + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            summary: summary.into(),
            severity,
            frameworks: Vec::new(),
            deprecated: false,
            check: Arc::new(check),
        }
    }

    pub fn with_frameworks<I>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = Framework>,
    {
        self.frameworks = frameworks.into_iter().collect();
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// True when any of the rule's frameworks is in `selected`.
    pub fn applies_to(&self, selected: &[Framework]) -> bool {
        self.frameworks.iter().any(|f| selected.contains(f))
    }

    /// Run the check against `state`.
    ///
    /// Never propagates a fault: a panicking check yields a single `ignored` result carrying the
    /// panic message, and anything it pushed before panicking is dropped.
    pub fn evaluate(&self, state: &State) -> Vec<ScanResult> {
        let mut results = Results::new(self);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.check)(state, &mut results)));
        match outcome {
            Ok(()) => results.into_vec(),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(rule = %self.id, %message, "rule evaluation fault");
                vec![self.fault(&message)]
            }
        }
    }

    fn fault(&self, message: &str) -> ScanResult {
        ScanResult {
            rule_id: self.id.clone(),
            severity: self.severity,
            status: Status::Ignored,
            code: ids::CODE_RULE_FAULT.to_string(),
            description: format!("rule evaluation fault: {message}"),
            range: None,
            resource: None,
            fingerprint: None,
            data: json!({ "summary": self.summary }),
        }
        .with_fingerprint()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

/// Collector handed to a check function; stamps every result with the rule's identity.
pub struct Results<'r> {
    rule: &'r Rule,
    out: Vec<ScanResult>,
}

impl<'r> Results<'r> {
    fn new(rule: &'r Rule) -> Self {
        Self {
            rule,
            out: Vec::new(),
        }
    }

    /// Record a violation located at `metadata`.
    pub fn fail(&mut self, resource: &str, description: impl Into<String>, metadata: &Metadata) {
        self.push(Status::Failed, ids::CODE_VIOLATION, resource, description.into(), metadata);
    }

    /// Record a compliant resource.
    pub fn pass(&mut self, resource: &str, metadata: &Metadata) {
        let description = self.rule.summary.clone();
        self.push(Status::Passed, ids::CODE_PASSED, resource, description, metadata);
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    fn push(
        &mut self,
        status: Status,
        code: &str,
        resource: &str,
        description: String,
        metadata: &Metadata,
    ) {
        let result = ScanResult {
            rule_id: self.rule.id.clone(),
            severity: self.rule.severity,
            status,
            code: code.to_string(),
            description,
            range: Some(metadata.range.clone()),
            resource: (!resource.is_empty()).then(|| resource.to_string()),
            fingerprint: None,
            data: json!({ "explicit": metadata.explicit }),
        };
        self.out.push(result.with_fingerprint());
    }

    fn into_vec(self) -> Vec<ScanResult> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{meta, state_with_account};

    #[test]
    fn results_are_stamped_with_rule_identity() {
        let rule = Rule::new("R1", "always fails", Severity::High, |_, r| {
            r.fail("res", "bad", &meta(7));
        });
        let out = rule.evaluate(&State::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rule_id, "R1");
        assert_eq!(out[0].severity, Severity::High);
        assert_eq!(out[0].status, Status::Failed);
        assert_eq!(out[0].resource.as_deref(), Some("res"));
        assert_eq!(out[0].range.as_ref().map(|r| r.start_line), Some(7));
        assert!(out[0].fingerprint.is_some());
    }

    #[test]
    fn panicking_check_is_contained() {
        let rule = Rule::new("BOOM", "panics", Severity::Low, |_, r| {
            r.fail("", "partial", &meta(1));
            panic!("missing field");
        });
        let out = rule.evaluate(&state_with_account("a", true, "TLS1_2"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, Status::Ignored);
        assert_eq!(out[0].code, ids::CODE_RULE_FAULT);
        assert!(out[0].description.contains("missing field"));
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let rule = Rule::new("BOOM", "panics", Severity::Low, |state, _| {
            panic!("{} accounts", state.azure.storage.accounts.len());
        });
        let out = rule.evaluate(&State::default());
        assert_eq!(out[0].description, "rule evaluation fault: 0 accounts");
    }

    #[test]
    fn applies_to_requires_intersection() {
        let rule = Rule::new("R", "", Severity::Low, |_, _| {})
            .with_frameworks([Framework::DEFAULT, Framework::CIS_AZURE_1_3]);
        assert!(rule.applies_to(&[Framework::CIS_AZURE_1_3]));
        assert!(!rule.applies_to(&[Framework::new("pci")]));
        assert!(!rule.applies_to(&[]));
    }
}
