//! Capacity-1 wake-up signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// A capacity-1 signal used to wake a blocked consumer without duplicate
/// wake-ups.
///
/// Arming an already-armed gate is a no-op, so any number of producers can
/// signal "there may be work" and the consumer observes at most one pending
/// wake-up. Used as the playlist request gate: armed by the connectivity
/// monitor on login and by `add` commands received while idle.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    inner: Arc<GateInner>,
}

#[derive(Debug, Default)]
struct GateInner {
    armed: AtomicBool,
    notify: Notify,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the gate. Idempotent: at most one wake-up is held.
    pub fn arm(&self) {
        if !self.inner.armed.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_one();
        }
    }

    /// Whether a wake-up is currently pending.
    pub fn is_armed(&self) -> bool {
        self.inner.armed.load(Ordering::Acquire)
    }

    /// Wait until the gate is armed, consuming the pending wake-up.
    pub async fn wait(&self) {
        loop {
            if self.inner.armed.swap(false, Ordering::AcqRel) {
                return;
            }
            self.inner.notify.notified().await;
        }
    }
}
