use crate::PolicyError;
use camino::Utf8Path;
use iacguard_types::{ScanContext, ScanResult, SourcePath};
use serde_json::Value as JsonValue;

/// One deployment's serialized state, ready for policy evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Input<'a> {
    /// Source path of the deployment the state came from.
    pub path: &'a SourcePath,
    /// Root of the filesystem the deployment was read from.
    pub fs: &'a Utf8Path,
    pub contents: &'a JsonValue,
}

/// Contract of a declarative policy interpreter.
///
/// `load_policies` is called at most once per successful load; after it returns `Ok`,
/// `evaluate` must be safe to call from several threads at once.
pub trait PolicyInterpreter: Send + Sync {
    fn load_policies(&mut self, policy_fs: &Utf8Path) -> Result<(), PolicyError>;

    /// Evaluate `input` against the loaded bundle. Implementations should poll `ctx` between
    /// units of work; ignoring it is allowed.
    fn evaluate(&self, ctx: &ScanContext, input: &Input<'_>) -> Result<Vec<ScanResult>, PolicyError>;
}
