//! Debounced flush scheduling.

use std::time::Duration;

use tokio::time::Instant;

/// Single-deadline debounce timer.
///
/// Holds at most one pending deadline. [`schedule_flush`](Self::schedule_flush)
/// replaces it, so a burst of mutations produces one flush once the burst has
/// been quiet for the whole window. A replaced or cancelled deadline never
/// fires.
#[derive(Debug, Clone)]
pub struct FlushScheduler {
    window: Duration,
    deadline: Option<Instant>,
}

impl FlushScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Cancels any pending deadline and starts a new one.
    pub fn schedule_flush(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Drops the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Completes when the pending deadline passes; never completes when there
    /// is none.
    pub async fn expired(&self) {
        sleep_until_deadline(self.deadline).await
    }

    /// Clears the deadline and returns true if it has passed.
    pub fn take_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Completes at `deadline`, or never when there is none.
///
/// Meant for a `tokio::select!` branch; the deadline is copied in so the
/// scheduler itself stays free to be mutated by other branches.
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
