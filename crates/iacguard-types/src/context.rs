//! Cooperative cancellation shared by every scan stage.
//!
//! A [`ScanContext`] is cheap to clone; all clones observe the same cancellation flag. Nothing is
//! preempted: the parser, the rule loop and the policy interpreter poll [`ScanContext::check`] at
//! their own boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Cancelled {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Clone, Debug, Default)]
pub struct ScanContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl ScanContext {
    /// A context that is never cancelled unless [`ScanContext::cancel`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Request cancellation. Visible to every clone of this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn err(&self) -> Option<Cancelled> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Some(Cancelled::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Cancelled::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        match self.err() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}
