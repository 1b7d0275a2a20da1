//! Timers for the typing session.
//!
//! A [`Scheduler`] arranges for a generation number to be delivered back to
//! the session after a delay. The session checks the number on delivery, so
//! a timer that fires after being superseded does nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Handle to one scheduled reveal.
///
/// Cancelling is idempotent and never fails.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// Creates a handle with no backing task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle that aborts a tokio task on cancel.
    #[must_use]
    pub fn with_abort(abort: AbortHandle) -> Self {
        Self {
            cancelled: Arc::default(),
            abort: Some(abort),
        }
    }

    /// Cancels the timer.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst)
            && let Some(abort) = &self.abort
        {
            abort.abort();
        }
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Source of delayed wake-ups.
pub trait Scheduler {
    /// Arranges for `generation` to be delivered after `delay`.
    fn schedule(&mut self, delay: Duration, generation: u64) -> TaskHandle;
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    generation: u64,
    handle: TaskHandle,
}

/// Scheduler driven by a fake clock.
///
/// Nothing fires on its own; callers pull due timers with
/// [`pop_due`](Self::pop_due). Used for tests and for replaying a typing
/// session without waiting.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    queue: Vec<Timer>,
}

impl ManualScheduler {
    /// Creates a scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fake time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of live (not cancelled) timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue
            .iter()
            .filter(|t| !t.handle.is_cancelled())
            .count()
    }

    /// Time at which the earliest live timer fires.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|t| !t.handle.is_cancelled())
            .map(|t| t.due)
            .min()
    }

    /// Removes the earliest live timer due at or before `until` and returns
    /// its generation. The clock moves forward to the timer's due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<u64> {
        self.queue.retain(|t| !t.handle.is_cancelled());
        let (pos, _) = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| t.due)?;
        let timer = self.queue.remove(pos);
        self.now = self.now.max(timer.due);
        Some(timer.generation)
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, generation: u64) -> TaskHandle {
        let handle = TaskHandle::new();
        self.queue.push(Timer {
            due: self.now + delay,
            generation,
            handle: handle.clone(),
        });
        handle
    }
}

/// Scheduler backed by tokio timers.
///
/// Each timer is a task that sleeps and then sends its generation on the
/// channel returned by [`new`](Self::new). Cancelling aborts the task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<u64>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver its timers fire into.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<u64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Scheduler for TokioScheduler {
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    fn schedule(&mut self, delay: Duration, generation: u64) -> TaskHandle {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The session may already be gone.
            let _ = tx.send(generation);
        });
        TaskHandle::with_abort(task.abort_handle())
    }
}
