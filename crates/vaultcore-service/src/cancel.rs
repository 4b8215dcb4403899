//! Cooperative cancellation token.
//!
//! Every boundary operation takes a [`CancelToken`] and checks it before
//! dispatching to the worker context. Cancellation is cooperative: a call
//! cancelled before dispatch performs no observable side effects; once
//! dispatched, the operation runs to completion so no partial cryptographic
//! state can leak.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cloneable cancellation flag shared between a caller and its pending
/// operations. A caller-imposed timeout is simply a `cancel()` from the
/// caller's side; the pending operation observes it at the next check.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Irreversible; all clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
