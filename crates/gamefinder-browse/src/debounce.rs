//! Trailing-edge debouncer for free-text search and continuous controls.
//!
//! # Design
//! - Each `submit` replaces the pending value and restarts the quiescence timer.
//! - `flush`/`submit_now` bypass the timer for explicit user actions, and
//!   `take_pending` lets them absorb a value that has not been emitted yet.
//! - Dropping the controller aborts the timer so nothing is emitted afterwards.
//! - Committed values are delivered on an unbounded channel owned by the caller.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Debounced input controller.
pub struct Debouncer<T> {
    window: Duration,
    slot: Arc<Mutex<Option<T>>>,
    timer: Option<JoinHandle<()>>,
    commits: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a controller and the receiver its committed values arrive on.
    #[must_use]
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (commits, rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                slot: Arc::new(Mutex::new(None)),
                timer: None,
                commits,
            },
            rx,
        )
    }

    /// Quiescence window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record a raw value and restart the timer.
    ///
    /// A zero window commits immediately.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime with a non-zero window.
    pub fn submit(&mut self, value: T) {
        if self.window.is_zero() {
            self.submit_now(value);
            return;
        }
        self.abort_timer();
        *self.lock_slot() = Some(value);

        let slot = Arc::clone(&self.slot);
        let commits = self.commits.clone();
        let window = self.window;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let ready = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(value) = ready {
                trace!("debounce window elapsed");
                let _ = commits.send(value);
            }
        }));
    }

    /// Commit the pending value now, if there is one.
    ///
    /// Returns whether a value was emitted.
    pub fn flush(&mut self) -> bool {
        self.abort_timer();
        let pending = self.lock_slot().take();
        pending.is_some_and(|value| self.commits.send(value).is_ok())
    }

    /// Discard any pending value and commit `value` immediately.
    pub fn submit_now(&mut self, value: T) {
        self.cancel();
        let _ = self.commits.send(value);
    }

    /// Stop the timer and hand back the pending value instead of emitting it.
    ///
    /// Lets a caller fold the pending value into an immediate commit.
    pub fn take_pending(&mut self) -> Option<T> {
        self.abort_timer();
        self.lock_slot().take()
    }

    /// Discard the pending value without emitting it.
    pub fn cancel(&mut self) {
        self.abort_timer();
        self.lock_slot().take();
    }

    /// Whether a value is waiting for the window to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock_slot().is_some()
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
