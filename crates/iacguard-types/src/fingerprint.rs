use crate::ScanResult;
use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a scan result.
///
/// Identity fields:
/// - rule_id
/// - code
/// - status
/// - filename and start line (if a range is present)
/// - resource (if present)
/// - description
pub fn fingerprint_for_result(result: &ScanResult) -> String {
    let status = match result.status {
        crate::Status::Passed => "passed",
        crate::Status::Failed => "failed",
        crate::Status::Ignored => "ignored",
    };
    let line;
    let mut parts = vec![result.rule_id.as_str(), result.code.as_str(), status];
    if let Some(range) = &result.range {
        line = range.start_line.to_string();
        parts.push(range.filename.as_str());
        parts.push(&line);
    }
    if let Some(resource) = &result.resource {
        parts.push(resource);
    }
    parts.push(&result.description);
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
