// src/exec/signal.rs

//! One-shot completion signal.

use std::sync::Arc;

use tokio::sync::watch;

/// A flag that flips from "pending" to "fired" exactly once.
///
/// Clones share the same flag. Firing twice is a no-op, and waiting on an
/// already-fired signal returns immediately.
#[derive(Debug, Clone)]
pub struct Completion {
    tx: Arc<watch::Sender<bool>>,
}

impl Completion {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Returns `true` only for the call that actually fired it.
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal has fired.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // `self` keeps the sender alive, so the channel cannot close here.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}
