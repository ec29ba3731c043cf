//! Broadcast "stop now" signal shared by the pool's executors and producers.
//!
//! Cancellation is modelled as a zero-capacity channel whose only sender is
//! dropped on `cancel()`. Every cloned receiver then reports disconnection,
//! which makes it usable as an arm of `crossbeam_channel::select!` next to
//! the work queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

struct SignalInner {
    trigger: Mutex<Option<Sender<()>>>,
    listener: Receiver<()>,
    cancelled: AtomicBool,
}

/// Cloneable cancellation flag. All clones observe the same state.
#[derive(Clone)]
pub struct CancellationSignal {
    inner: Arc<SignalInner>,
}

impl CancellationSignal {
    /// Create a signal in the "not cancelled" state.
    #[must_use]
    pub fn new() -> Self {
        let (trigger, listener) = bounded(0);
        Self {
            inner: Arc::new(SignalInner {
                trigger: Mutex::new(Some(trigger)),
                listener,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Cancel. Idempotent; wakes everything selecting on a listener.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.trigger.lock().take();
    }

    /// Whether `cancel` has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once cancelled.
    ///
    /// Nothing is ever sent on it; only the disconnection is meaningful.
    #[must_use]
    pub fn listener(&self) -> Receiver<()> {
        self.inner.listener.clone()
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_listener_blocks_until_cancelled() {
        let signal = CancellationSignal::new();
        let listener = signal.listener();
        assert!(listener.recv_timeout(Duration::from_millis(20)).is_err());
        assert!(!signal.is_cancelled());

        let remote = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        // Disconnection is reported as an error, immediately after cancel.
        let woke = listener.recv_timeout(Duration::from_secs(2));
        assert_eq!(woke, Err(crossbeam_channel::RecvTimeoutError::Disconnected));
        assert!(signal.is_cancelled());
        handle.join().unwrap();
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let signal = CancellationSignal::new();
        signal.cancel();
        signal.cancel();
        assert!(signal.is_cancelled());
        assert!(signal.listener().try_recv().is_err());
    }
}
