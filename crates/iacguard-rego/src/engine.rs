use crate::{Input, PolicyError, PolicyInterpreter};
use camino::Utf8Path;
use iacguard_types::{ScanContext, ScanResult};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{debug, warn};

type Factory<I> = Box<dyn Fn() -> I + Send + Sync>;

/// Lazily built, cached policy interpreter.
///
/// One mutex guards both "is it loaded?" and the load itself. Once loaded the interpreter is
/// published through a `OnceLock`, so evaluations read it without taking the load lock.
pub struct PolicyEngine<I> {
    factory: Factory<I>,
    load_lock: Mutex<()>,
    loaded: OnceLock<I>,
}

impl<I: PolicyInterpreter> PolicyEngine<I> {
    /// `factory` builds a fresh, unloaded interpreter for each load attempt.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            load_lock: Mutex::new(()),
            loaded: OnceLock::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Load the policy bundle from `policy_fs` unless a previous call already did.
    ///
    /// On failure nothing is cached and the next call tries again.
    pub fn ensure_loaded(&self, policy_fs: &Utf8Path) -> Result<(), PolicyError> {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.loaded.get().is_some() {
            return Ok(());
        }

        let mut interpreter = (self.factory)();
        if let Err(err) = interpreter.load_policies(policy_fs) {
            warn!(fs = %policy_fs, error = %err, "policy bundle failed to load");
            return Err(err);
        }
        // Only this thread can be here while holding the lock.
        let _ = self.loaded.set(interpreter);
        debug!(fs = %policy_fs, "policy bundle loaded");
        Ok(())
    }

    pub fn scan_input(
        &self,
        ctx: &ScanContext,
        input: &Input<'_>,
    ) -> Result<Vec<ScanResult>, PolicyError> {
        let interpreter = self.loaded.get().ok_or(PolicyError::NotLoaded)?;
        interpreter.evaluate(ctx, input)
    }
}
