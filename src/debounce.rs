//! Debounce scheduler
//!
//! An owned timer handle: each [`Debouncer::trigger`] replaces whatever was
//! pending and pushes the deadline out by the configured delay. The value
//! is delivered once the input has been quiet for that long. Nothing is
//! spawned; the owner awaits [`Debouncer::fired`] (or polls
//! [`Debouncer::poll_due`] from a frame loop), so cancelling is just
//! dropping the pending value.

use std::future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    value: T,
}

/// Debounced delivery of the most recent value
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, superseding any pending value
    pub fn trigger(&mut self, value: T) {
        self.pending = Some(Pending {
            deadline: Instant::now() + self.delay,
            value,
        });
    }

    /// Drop the pending value, if any. Returns whether something was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the pending value if its deadline has passed at `now`
    pub fn poll_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Wait for the pending value to come due.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: the value is
    /// only taken after the sleep completes, with no further await point.
    pub async fn fired(&mut self) -> T {
        let Some(deadline) = self.deadline() else {
            return future::pending().await;
        };
        sleep_until(deadline).await;
        match self.pending.take() {
            Some(p) => p.value,
            None => future::pending().await,
        }
    }
}
