//! Cancel-and-reschedule timer for coalescing layout writes.
//!
//! The debouncer does not own a thread. The event loop asks for the
//! [`Debouncer::deadline`], sleeps until then, and calls [`Debouncer::fire`].

use std::time::{Duration, Instant};

/// A single pending deadline that moves forward on every reschedule.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create an idle debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Get the quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period. A pending deadline keeps its current value.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule (or push back) the deadline relative to now.
    pub fn schedule(&mut self) {
        self.schedule_at(Instant::now());
    }

    /// Schedule (or push back) the deadline relative to `now`.
    pub fn schedule_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the pending deadline has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume the deadline if it has passed.
    /// Returns true exactly once per elapsed deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_by_default() {
        let debouncer = Debouncer::new(Duration::from_millis(400));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.is_due(Instant::now()));
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        let start = Instant::now();
        debouncer.schedule_at(start);

        assert!(!debouncer.fire(start + Duration::from_millis(399)));
        assert!(debouncer.fire(start + Duration::from_millis(400)));
        assert!(!debouncer.fire(start + Duration::from_millis(800)));
    }

    #[test]
    fn test_reschedule_pushes_deadline_back() {
        let mut debouncer = Debouncer::new(Duration::from_millis(400));
        let start = Instant::now();
        debouncer.schedule_at(start);
        debouncer.schedule_at(start + Duration::from_millis(300));

        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(700)));
        assert!(!debouncer.is_due(start + Duration::from_millis(500)));
        assert!(debouncer.is_due(start + Duration::from_millis(700)));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        assert!(!debouncer.cancel());
        debouncer.schedule();
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
    }
}
