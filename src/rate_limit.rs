//! Sliding-window admission control for outbound API calls
//!
//! Every remote call goes through [`RateLimiter::acquire`]: a hard
//! [`admit`](RateLimiter::admit) check followed by a soft throttle delay once
//! the window is mostly full. The window lives in memory only and starts empty
//! after a restart.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::config::RateLimitConfig;
use crate::error::{Result, RoostError};

/// Shared request window
pub struct RateLimiter {
    window: Mutex<VecDeque<DateTime<Utc>>>,
    max_requests: usize,
    window_len: Duration,
    throttle_at: usize,
    throttle_delay: std::time::Duration,
    clock: SharedClock,
}

impl RateLimiter {
    /// Create a limiter from config
    pub fn new(config: &RateLimitConfig, clock: SharedClock) -> Self {
        let max_requests = config.max_requests.max(1);
        let ratio = config.throttle_ratio.clamp(0.0, 1.0);
        let throttle_at = ((max_requests as f64) * ratio).ceil() as usize;

        Self {
            window: Mutex::new(VecDeque::with_capacity(max_requests)),
            max_requests,
            window_len: i64::try_from(config.window_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            throttle_at,
            throttle_delay: std::time::Duration::from_millis(config.throttle_delay_ms),
            clock,
        }
    }

    /// Hard gate: record a request or fail with how long to wait.
    ///
    /// Pruning, the capacity check and the append happen under one lock, so
    /// concurrent callers can never overshoot the cap together.
    pub async fn admit(&self) -> Result<()> {
        let now = self.clock.now();
        let mut window = self.window.lock().await;
        self.prune(&mut window, now);

        if window.len() >= self.max_requests {
            let oldest = window.front().copied().unwrap_or(now);
            let retry_after = (self.window_len - (now - oldest))
                .to_std()
                .unwrap_or_default();
            warn!(
                "Rate limit reached ({} requests in {}s), retry in {:?}",
                window.len(),
                self.window_len.num_seconds(),
                retry_after
            );
            return Err(RoostError::RateLimitExceeded { retry_after });
        }

        window.push_back(now);
        Ok(())
    }

    /// Soft gate: whether the window is full enough that callers should slow down
    pub async fn throttle_hint(&self) -> bool {
        self.in_window().await >= self.throttle_at
    }

    /// Admit, then apply the throttle delay if the window is nearly full
    pub async fn acquire(&self) -> Result<()> {
        self.admit().await?;
        if self.throttle_hint().await && !self.throttle_delay.is_zero() {
            debug!("Near rate limit, delaying {:?}", self.throttle_delay);
            tokio::time::sleep(self.throttle_delay).await;
        }
        Ok(())
    }

    /// Requests counted in the trailing window
    pub async fn in_window(&self) -> usize {
        let now = self.clock.now();
        let mut window = self.window.lock().await;
        self.prune(&mut window, now);
        window.len()
    }

    fn prune(&self, window: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
        while window
            .front()
            .is_some_and(|&ts| now - ts >= self.window_len)
        {
            window.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn limiter(max_requests: usize) -> (Arc<RateLimiter>, ManualClock) {
        let clock = ManualClock::default();
        let config = RateLimitConfig {
            max_requests,
            window_secs: 60,
            throttle_ratio: 0.8,
            throttle_delay_ms: 0,
        };
        (Arc::new(RateLimiter::new(&config, Arc::new(clock.clone()))), clock)
    }

    #[tokio::test]
    async fn test_cap_plus_one_is_rejected() {
        let (limiter, clock) = limiter(100);
        for _ in 0..100 {
            assert_ok!(limiter.admit().await);
            clock.advance(Duration::milliseconds(100));
        }

        let err = limiter.admit().await.unwrap_err();
        match err {
            RoostError::RateLimitExceeded { retry_after } => {
                // First call was 10s ago, so 50s remain in its window
                assert_eq!(retry_after, std::time::Duration::from_secs(50));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(limiter.in_window().await, 100);
    }

    #[tokio::test]
    async fn test_window_slides_after_sixty_seconds() {
        let (limiter, clock) = limiter(3);
        let first = clock.now();
        for _ in 0..3 {
            assert_ok!(limiter.admit().await);
        }
        assert_err!(limiter.admit().await);

        clock.set(first + Duration::seconds(59));
        assert_err!(limiter.admit().await);

        clock.set(first + Duration::seconds(60));
        assert_ok!(limiter.admit().await);
        assert_eq!(limiter.in_window().await, 1);
    }

    #[tokio::test]
    async fn test_throttle_hint_at_eighty_percent() {
        let (limiter, _) = limiter(10);
        for _ in 0..7 {
            limiter.admit().await.unwrap();
        }
        assert!(!limiter.throttle_hint().await);
        limiter.admit().await.unwrap();
        assert!(limiter.throttle_hint().await);
    }

    #[tokio::test]
    async fn test_concurrent_admission_never_exceeds_cap() {
        let (limiter, _) = limiter(20);
        let mut handles = Vec::new();
        for _ in 0..50 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move { limiter.admit().await.is_ok() }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 20);
        assert_eq!(limiter.in_window().await, 20);
    }

    #[tokio::test]
    async fn test_acquire_propagates_rejection() {
        let (limiter, _) = limiter(1);
        assert_ok!(limiter.acquire().await);
        assert!(matches!(
            limiter.acquire().await,
            Err(RoostError::RateLimitExceeded { .. })
        ));
    }
}
