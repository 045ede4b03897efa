use iacguard_rego::PolicyError;
use iacguard_types::{Cancelled, SourcePath};
use thiserror::Error;

/// Why a `scan_fs` call produced no results.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The template parser failed; its message is surfaced unchanged.
    #[error(transparent)]
    Parse(anyhow::Error),

    #[error("load policy bundle: {0}")]
    PolicyLoad(PolicyError),

    #[error("rego scan error in {path}: {error}")]
    PolicyEval { path: SourcePath, error: PolicyError },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl ScanError {
    /// Parser errors caused by cancellation are reported as cancellation.
    pub(crate) fn from_parse(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Cancelled>() {
            Some(cancelled) => ScanError::Cancelled(*cancelled),
            None => ScanError::Parse(err),
        }
    }

    pub(crate) fn from_policy(path: &SourcePath, err: PolicyError) -> Self {
        match err {
            PolicyError::Cancelled(cancelled) => ScanError::Cancelled(cancelled),
            error => ScanError::PolicyEval {
                path: path.clone(),
                error,
            },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanError::Cancelled(_))
    }
}
