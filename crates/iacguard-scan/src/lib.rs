//! Scan orchestration.
//!
//! A [`Scanner`] turns a filesystem location into one flat list of [`ScanResult`]s:
//! the template parser yields deployments, each deployment is adapted into a canonical
//! [`State`], and every state is checked by the structural rules of the catalog and then by the
//! policy engine. Parsing and adaptation are supplied by the caller through the
//! [`TemplateParser`] and [`StateAdapter`] contracts.
//!
//! [`ScanResult`]: iacguard_types::ScanResult
//! [`State`]: iacguard_state::State

#![forbid(unsafe_code)]

mod error;
mod options;
mod scanner;
mod source;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use error::ScanError;
pub use options::{
    ConfigurableScanner, ScannerConfig, ScannerOption, with_frameworks,
    with_include_deprecated_checks, with_rego_only,
};
pub use scanner::{FsScanner, Scanner};
pub use source::{Deployment, StateAdapter, TemplateParser};
