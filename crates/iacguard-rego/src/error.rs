use camino::Utf8PathBuf;
use iacguard_types::Cancelled;
use thiserror::Error;

/// Errors raised while loading or evaluating a policy bundle.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("read policy source {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compile policy {path}: {message}")]
    Compile { path: String, message: String },

    #[error("evaluate {query}: {message}")]
    Evaluate { query: String, message: String },

    #[error("invalid policy input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("policy engine used before a bundle was loaded")]
    NotLoaded,

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}
