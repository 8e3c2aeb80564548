//! Cooperative cancellation for the bootstrap poll loop.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Cancellation flag that can interrupt a blocking wait from another thread.
///
/// Waiting goes through a condition variable, so [`Cancellation::cancel`]
/// wakes a sleeping poll loop immediately instead of at the next interval.
#[derive(Debug, Default)]
pub struct Cancellation {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token as cancelled and wakes every waiter.
    pub fn cancel(&self) {
        *self.flag() = true;
        self.wake.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Sleeps for up to `timeout`, returning early when cancelled.
    ///
    /// Returns `true` when the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.flag();
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = Cancellation::new();
        assert!(!token.is_cancelled());
        assert!(!token.wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn cancelled_token_returns_immediately() {
        let token = Cancellation::new();
        token.cancel();
        let started = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn cancel_wakes_a_blocked_waiter() {
        let token = Arc::new(Cancellation::new());
        let canceller = Arc::clone(&token);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            canceller.cancel();
        });

        let started = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(10)));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "waiter should wake promptly, took {:?}",
            started.elapsed()
        );
        handle.join().expect("canceller thread");
    }
}
