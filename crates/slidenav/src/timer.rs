use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for deferred actions.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when advanced. Clones share the same time,
/// so a test can keep one handle while the controller owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A one-shot deferred action carrying a payload until its deadline.
///
/// Nothing fires on its own: the owner polls with the current time and
/// receives the payload once the deadline has been reached.
#[derive(Debug)]
pub struct Timer<T> {
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    started: Instant,
    due: Instant,
    payload: T,
}

impl<T> Timer<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Arm the timer to fire `delay` after `now`. Replaces (and returns) any
    /// payload that was still pending.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> Option<T> {
        self.pending
            .replace(Pending {
                started: now,
                due: now + delay,
                payload,
            })
            .map(|p| p.payload)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the timer fires, zero once overdue.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }

    /// Fraction of the scheduled delay that has elapsed, clamped to `0..=1`.
    pub fn elapsed_fraction(&self, now: Instant) -> Option<f32> {
        self.pending.as_ref().map(|p| {
            let total = p.due.saturating_duration_since(p.started).as_secs_f32();
            if total <= 0.0 {
                return 1.0;
            }
            (now.saturating_duration_since(p.started).as_secs_f32() / total).clamp(0.0, 1.0)
        })
    }

    /// Take the payload if the deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.cancel()
        } else {
            None
        }
    }
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self::new()
    }
}
