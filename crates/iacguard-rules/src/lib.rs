//! Structural rules (no IO).
//!
//! Input: a canonical `State` built elsewhere.
//! Output: scan results, one batch per rule.
//!
//! Rules are plain records plus a pure check function. A [`RuleCatalog`] is filled at startup
//! (explicitly, one `register` call per rule) and is read-only while scanning.

#![forbid(unsafe_code)]

mod catalog;
pub mod checks;
mod rule;

#[cfg(test)]
mod test_support;

pub use catalog::RuleCatalog;
pub use rule::{CheckFn, Results, Rule};
