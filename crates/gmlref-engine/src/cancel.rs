//! Cooperative cancellation
//!
//! Long operations over large projects check the token between files and
//! abort with `RefactorError::Cancelled`. Cancellation never interrupts a
//! file mid-splice; files already written stay written and their
//! `ApplyResult` rows are preserved by the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation handle shared between the caller and a running
/// operation
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; observed at the next between-files check
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
