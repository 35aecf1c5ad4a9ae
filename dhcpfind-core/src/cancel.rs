//! Cooperative cancellation shared between the probe loop and its watchdogs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable cancellation flag
///
/// Every clone observes the same flag. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
