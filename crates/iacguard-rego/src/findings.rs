//! Turn raw policy query values into scan results.

use iacguard_types::ids::{CODE_PASSED, CODE_POLICY_DENY};
use iacguard_types::{Range, ScanResult, Severity, SourcePath, Status};
use serde_json::{Value as JsonValue, json};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PolicyMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl PolicyMetadata {
    /// Read `__rego_metadata__`; missing fields fall back to the package name and medium severity.
    pub fn from_json(package: &str, raw: Option<&JsonValue>) -> Self {
        let field = |key: &str| {
            raw.and_then(|m| m.get(key))
                .and_then(JsonValue::as_str)
                .map(str::to_string)
        };
        let id = field("id").unwrap_or_else(|| package.to_string());
        let title = field("title").unwrap_or_else(|| id.clone());
        let description = field("description").unwrap_or_else(|| title.clone());
        let severity = field("severity")
            .as_deref()
            .and_then(Severity::parse)
            .unwrap_or(Severity::Medium);
        Self {
            id,
            title,
            description,
            severity,
        }
    }
}

/// One result per denial, or a single pass when the package denied nothing.
pub(crate) fn from_denials(
    package: &str,
    metadata: &PolicyMetadata,
    denials: Option<JsonValue>,
    path: &SourcePath,
) -> Vec<ScanResult> {
    let entries = match denials {
        Some(JsonValue::Array(items)) => items,
        Some(JsonValue::Null) | None => Vec::new(),
        Some(single) => vec![single],
    };

    if entries.is_empty() {
        return vec![ScanResult {
            rule_id: metadata.id.clone(),
            severity: metadata.severity,
            status: Status::Passed,
            code: CODE_PASSED.to_string(),
            description: metadata.title.clone(),
            range: Some(Range::new(path.clone(), 0, 0)),
            resource: None,
            fingerprint: None,
            data: json!({ "package": package }),
        }
        .with_fingerprint()];
    }

    entries
        .iter()
        .map(|entry| denial(package, metadata, entry, path))
        .collect()
}

fn denial(
    package: &str,
    metadata: &PolicyMetadata,
    entry: &JsonValue,
    path: &SourcePath,
) -> ScanResult {
    let (message, range) = match entry {
        JsonValue::String(msg) => (msg.clone(), Range::new(path.clone(), 0, 0)),
        JsonValue::Object(obj) => {
            let msg = obj
                .get("msg")
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| metadata.description.clone());
            let filename = obj
                .get("filepath")
                .and_then(JsonValue::as_str)
                .map(SourcePath::new)
                .unwrap_or_else(|| path.clone());
            let start = line(obj.get("startline"));
            let end = line(obj.get("endline")).max(start);
            (msg, Range::new(filename, start, end))
        }
        other => (other.to_string(), Range::new(path.clone(), 0, 0)),
    };

    ScanResult {
        rule_id: metadata.id.clone(),
        severity: metadata.severity,
        status: Status::Failed,
        code: CODE_POLICY_DENY.to_string(),
        description: message,
        range: Some(range),
        resource: None,
        fingerprint: None,
        data: json!({ "package": package }),
    }
    .with_fingerprint()
}

fn line(raw: Option<&JsonValue>) -> u32 {
    raw.and_then(JsonValue::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}
