//! Shutdown notice for tasks spawned by the application.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::lifecycle::signals::NativeSignal;

/// Coordinator for graceful shutdown.
///
/// Fired once by the driver when a signal stops the run. Background tasks
/// subscribe, receive the signal that caused the stop, and drop their
/// receiver once they have finished cleaning up.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<NativeSignal>,
    fired: Arc<AtomicBool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to the shutdown notice.
    pub fn subscribe(&self) -> broadcast::Receiver<NativeSignal> {
        self.tx.subscribe()
    }

    /// Fire the notice. Only the first call has an effect.
    pub fn trigger(&self, signal: NativeSignal) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(signal);
    }

    /// Whether the notice has been fired.
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Wait until every subscriber has dropped its receiver, at most `grace`.
    ///
    /// Returns false if subscribers were still alive when the grace ran out.
    pub async fn drain(&self, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        let mut ticker = time::interval(Duration::from_millis(10));

        loop {
            let remaining = self.receiver_count();
            if remaining == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!(remaining, "Shutdown grace elapsed with tasks still running");
                return false;
            }
            ticker.tick().await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
