//! Sliding-window rate limiting for outbound provider calls.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Mapbox geocoding quota: 600 requests per minute.
pub const MAPBOX_GEOCODING_CALLS: usize = 600;
pub const MAPBOX_GEOCODING_PERIOD: Duration = Duration::from_secs(60);

/// Caps calls to `max_calls` within any trailing `period`.
///
/// [`acquire`](Self::acquire) waits until the window has room instead of
/// failing, so callers never see a quota error.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Limiter matching the published Mapbox geocoding quota.
    pub fn mapbox_geocoding() -> Self {
        Self::new(MAPBOX_GEOCODING_CALLS, MAPBOX_GEOCODING_PERIOD)
    }

    /// Waits for a free slot in the window and records the call.
    pub async fn acquire(&self) {
        loop {
            let mut calls = self.calls.lock().await;
            let now = Instant::now();

            while let Some(&oldest) = calls.front() {
                if now.duration_since(oldest) >= self.period {
                    calls.pop_front();
                } else {
                    break;
                }
            }

            if calls.len() < self.max_calls {
                calls.push_back(now);
                return;
            }

            let wait = calls
                .front()
                .map(|&oldest| self.period.saturating_sub(now.duration_since(oldest)))
                .unwrap_or_default();
            drop(calls);

            tracing::debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Calls currently counted against the window.
    pub async fn in_flight(&self) -> usize {
        let calls = self.calls.lock().await;
        let now = Instant::now();
        calls
            .iter()
            .filter(|&&call| now.duration_since(call) < self.period)
            .count()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::mapbox_geocoding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_quota_call_is_delayed_not_rejected() {
        let limiter = RateLimiter::mapbox_geocoding();
        let start = Instant::now();

        for _ in 0..MAPBOX_GEOCODING_CALLS {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));

        limiter.acquire().await;
        assert!(start.elapsed() >= MAPBOX_GEOCODING_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let limiter = RateLimiter::new(3, Duration::from_secs(10));
        let start = Instant::now();

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(4)).await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Only the first call has to leave the window.
        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(10));
        assert!(waited < Duration::from_secs(14));
        assert_eq!(limiter.in_flight().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_limit_still_admits_calls() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(limiter.in_flight().await, 1);
    }
}
