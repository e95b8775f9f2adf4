use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use accrue_core::error::AccrueError;

/// Call-in-progress flag shared by every top-level entry point of one
/// engine instance. Re-entering while a call is in flight fails instead of
/// observing a half-updated settlement.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyLock {
    busy: Arc<AtomicBool>,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a call as in progress. The flag clears when the returned guard
    /// drops, on every exit path.
    pub fn enter(&self) -> Result<CallGuard, AccrueError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AccrueError::CallInProgress)?;
        Ok(CallGuard { busy: Arc::clone(&self.busy) })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Scoped release of a `ReentrancyLock`.
#[must_use = "the call is only guarded while the CallGuard is alive"]
#[derive(Debug)]
pub struct CallGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
