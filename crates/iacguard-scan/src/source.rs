use camino::Utf8Path;
use iacguard_state::State;
use iacguard_types::{Range, ScanContext, SourcePath};

/// One parsed template unit.
pub trait Deployment {
    fn source_path(&self) -> &SourcePath;
    fn range(&self) -> &Range;
}

/// Turns files under a directory into deployments.
pub trait TemplateParser {
    type Deployment: Deployment;

    /// Short human name for logs and reports.
    fn name(&self) -> &'static str;

    /// Parse every template under `dir`, which is relative to `fs_root`.
    ///
    /// A parser that stops because `ctx` was cancelled should return the
    /// [`iacguard_types::Cancelled`] value as the error so callers can tell it apart.
    fn parse_fs(
        &self,
        ctx: &ScanContext,
        fs_root: &Utf8Path,
        dir: &str,
    ) -> anyhow::Result<Vec<Self::Deployment>>;
}

/// Builds the canonical state for one deployment. Has no failure path.
pub trait StateAdapter<D> {
    fn adapt(&self, ctx: &ScanContext, deployment: &D) -> State;
}
