//! Declarative policy evaluation.
//!
//! Two layers:
//! - [`PolicyInterpreter`]: the black-box interpreter contract (load a bundle, evaluate input),
//!   with a `regorus`-backed implementation in [`RegoInterpreter`].
//! - [`PolicyEngine`]: the scanner-owned adapter that builds and loads one interpreter lazily,
//!   exactly once, and then serves concurrent evaluations.

#![forbid(unsafe_code)]

mod engine;
mod error;
mod findings;
mod interpreter;
mod rego;

pub use engine::PolicyEngine;
pub use error::PolicyError;
pub use interpreter::{Input, PolicyInterpreter};
pub use rego::{DEFAULT_NAMESPACES, RegoInterpreter, RegoOptions};
