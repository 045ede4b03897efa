use crate::SourcePath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Severity follows the usual cloud-posture ladder.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Case-insensitive parse; policy metadata commonly uses `HIGH`.
    pub fn parse(v: &str) -> Option<Severity> {
        match v.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Ignored,
}

/// Line range inside a scanned file. Lines are 1-based and inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Range {
    pub filename: SourcePath,
    pub start_line: u32,
    pub end_line: u32,
}

impl Range {
    pub fn new(filename: SourcePath, start_line: u32, end_line: u32) -> Self {
        Self {
            filename,
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    pub fn filename(&self) -> &SourcePath {
        &self.filename
    }
}

/// One outcome of evaluating a structural rule or a policy against a deployment.
///
/// Both evaluation strategies emit this shape so their outputs concatenate without adaptation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScanResult {
    pub rule_id: String,
    pub severity: Severity,
    pub status: Status,
    pub code: String,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,

    /// Name of the offending resource, when the evaluator knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Stable identifier intended for dedup and trending (see [`crate::fingerprint`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Evaluator-specific structured payload.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: JsonValue,
}

impl ScanResult {
    pub fn is_failure(&self) -> bool {
        self.status == Status::Failed
    }

    /// Fill in `fingerprint` from the identity fields.
    pub fn with_fingerprint(mut self) -> Self {
        self.fingerprint = Some(crate::fingerprint::fingerprint_for_result(&self));
        self
    }
}
