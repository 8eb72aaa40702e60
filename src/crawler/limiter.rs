//! Global request spacing
//!
//! One limiter governs every outbound request of a crawl, whichever host it
//! goes to. A crawl covers a single site, so there is no per-host bookkeeping.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Polling granularity while waiting for the interval to elapse
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Enforces a minimum interval between dispatched requests
///
/// The "last dispatch" timestamp is held behind a single mutex for the whole
/// wait, so callers are released one at a time even if several wait at once.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request_at: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter; the first request is never delayed
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request_at: Mutex::new(None),
        }
    }

    /// The configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request may be dispatched, then records the dispatch
    ///
    /// Returns how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last_request_at.lock().await;
        let started = Instant::now();

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            loop {
                let now = Instant::now();
                if now >= ready_at {
                    break;
                }
                tokio::time::sleep((ready_at - now).min(POLL_INTERVAL)).await;
            }
        }

        *last = Some(Instant::now());
        started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let waited = limiter.acquire().await;
        assert!(waited < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_five_requests_respect_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = std::time::Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert!(
            start.elapsed() >= Duration::from_millis(800),
            "five requests finished in {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_no_wait_after_interval_elapsed() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let waited = limiter.acquire().await;
        assert!(waited < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_spaced() {
        let limiter = std::sync::Arc::new(RateLimiter::new(Duration::from_millis(150)));
        let start = std::time::Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
