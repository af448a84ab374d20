//! Minimum-spacing rate limiter for an external service.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between consecutive requests.
///
/// Each client owns its own limiter, so two clients never delay each other.
/// Waiters are serialised by the internal lock.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until a request may be sent, then record it as sent.
    ///
    /// Returns how long the caller was held back.
    pub fn wait(&self) -> Duration {
        let mut last_request = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let waited = match *last_request {
            Some(last) => {
                let remaining = self.min_interval.saturating_sub(last.elapsed());
                if !remaining.is_zero() {
                    tracing::debug!(wait_ms = remaining.as_millis() as u64, "rate limit wait");
                    thread::sleep(remaining);
                }
                remaining
            }
            None => Duration::ZERO,
        };

        *last_request = Some(Instant::now());
        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        assert_eq!(limiter.wait(), Duration::ZERO);
    }

    #[test]
    fn test_consecutive_requests_are_spaced() {
        let interval = Duration::from_millis(60);
        let limiter = RateLimiter::new(interval);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait();
        }
        assert!(start.elapsed() >= interval * 2, "elapsed {:?}", start.elapsed());
    }

    #[test]
    fn test_limiters_are_independent() {
        let a = RateLimiter::new(Duration::from_secs(5));
        let b = RateLimiter::new(Duration::from_secs(5));

        let start = Instant::now();
        a.wait();
        b.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_no_wait_after_interval_elapsed() {
        let limiter = RateLimiter::new(Duration::from_millis(20));
        limiter.wait();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(limiter.wait(), Duration::ZERO);
    }
}
