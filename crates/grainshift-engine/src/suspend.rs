//! Process suspension around re-preparation.
//!
//! Toggling oversampling changes buffer sizes and latency, which can only
//! happen in `prepare`. Until the host calls it again, the processor passes
//! audio through untouched instead of running a pipeline sized for the old
//! configuration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag that holds processing off until the next `prepare`.
///
/// Clones share the same flag, so a UI thread can keep one and suspend the
/// audio thread's processor.
#[derive(Debug, Clone, Default)]
pub struct ProcessSuspender {
    suspended: Arc<AtomicBool>,
}

impl ProcessSuspender {
    /// Create in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold processing off until [`resume`](Self::resume). Any thread.
    pub fn suspend(&self) {
        if !self.suspended.swap(true, Ordering::AcqRel) {
            tracing::debug!("processing suspended until next prepare");
        }
    }

    /// Clear the flag. Called from `prepare`.
    pub fn resume(&self) {
        self.suspended.store(false, Ordering::Release);
    }

    /// True while suspended.
    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }
}
