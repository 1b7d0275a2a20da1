//! A typewriter driven by a scheduler.

use crate::render::delay::DelayPolicy;
use crate::render::scheduler::{ManualScheduler, Scheduler, TaskHandle};
use crate::render::typewriter::Typewriter;
use std::time::Duration;

/// Cancellable typing animation.
///
/// At most one reveal is pending at a time. Every target change bumps the
/// generation and cancels the pending reveal, so a timer that still fires
/// afterwards is ignored by [`on_fire`](Self::on_fire). Dropping the session
/// cancels whatever is pending.
#[derive(Debug)]
pub struct TypingSession<S: Scheduler> {
    typewriter: Typewriter,
    scheduler: S,
    pending: Option<TaskHandle>,
    generation: u64,
}

impl<S: Scheduler> TypingSession<S> {
    /// Creates an idle session.
    pub const fn new(policy: DelayPolicy, scheduler: S) -> Self {
        Self {
            typewriter: Typewriter::new(policy),
            scheduler,
            pending: None,
            generation: 0,
        }
    }

    /// Starts typing `target`; same as [`update_target`](Self::update_target).
    pub fn start(&mut self, target: &str) -> String {
        self.update_target(target)
    }

    /// Sets a new target and returns the text revealed right away.
    ///
    /// An unchanged target is a no-op. Otherwise the pending reveal is
    /// cancelled, the first remaining grapheme is revealed immediately and
    /// the next reveal is scheduled.
    pub fn update_target(&mut self, target: &str) -> String {
        if target == self.typewriter.target() {
            return String::new();
        }

        self.cancel_pending();
        self.generation += 1;
        self.typewriter.set_target(target);
        tracing::trace!(
            generation = self.generation,
            remaining = self.typewriter.remaining().len(),
            "typing target updated"
        );
        self.step()
    }

    /// Handles a fired timer and returns the text it revealed.
    ///
    /// Returns `None` if the timer belongs to a superseded generation or
    /// nothing was pending.
    pub fn on_fire(&mut self, generation: u64) -> Option<String> {
        if generation != self.generation || self.pending.is_none() {
            tracing::trace!(
                fired = generation,
                current = self.generation,
                "ignoring stale reveal"
            );
            return None;
        }
        self.pending = None;
        Some(self.step())
    }

    /// Stops typing. The displayed text stays as it is.
    pub fn cancel(&mut self) {
        self.cancel_pending();
        self.generation += 1;
    }

    /// Reveals the rest of the target at once and returns it.
    pub fn finish_now(&mut self) -> String {
        self.cancel_pending();
        self.typewriter.skip_to_end().to_string()
    }

    /// Text displayed so far.
    #[must_use]
    pub fn displayed(&self) -> &str {
        self.typewriter.displayed()
    }

    /// Current target text.
    #[must_use]
    pub fn target(&self) -> &str {
        self.typewriter.target()
    }

    /// Returns `true` once the target is fully displayed and nothing is pending.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.typewriter.is_complete() && self.pending.is_none()
    }

    /// Returns `true` while a reveal is scheduled.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the scheduler.
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn step(&mut self) -> String {
        let Some(reveal) = self.typewriter.tick() else {
            return String::new();
        };
        if !self.typewriter.is_complete() {
            self.pending = Some(self.scheduler.schedule(reveal.delay, self.generation));
        }
        reveal.text
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }
}

impl<S: Scheduler> Drop for TypingSession<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl TypingSession<ManualScheduler> {
    /// Moves the fake clock forward by `by`, firing every due reveal.
    ///
    /// Returns the text revealed along the way.
    pub fn advance(&mut self, by: Duration) -> String {
        let until = self.scheduler.now() + by;
        let mut revealed = String::new();
        while let Some(generation) = self.scheduler.pop_due(until) {
            if let Some(text) = self.on_fire(generation) {
                revealed.push_str(&text);
            }
        }
        self.scheduler.advance_to(until);
        revealed
    }

    /// Fires reveals until typing completes and returns the text revealed.
    pub fn run_to_completion(&mut self) -> String {
        let mut revealed = String::new();
        while let Some(generation) = self.scheduler.pop_due(Duration::MAX) {
            if let Some(text) = self.on_fire(generation) {
                revealed.push_str(&text);
            }
        }
        revealed
    }
}
