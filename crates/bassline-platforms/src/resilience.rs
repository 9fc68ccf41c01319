//! Resilience primitives for platform clients.

use std::future::Future;
use std::sync::Arc;

use backon::{ExponentialBuilder, Retryable};
use bassline_core::model::Platform;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

use crate::error::{PlatformError, PlatformResult};

/// Per-client rate limiter using a token-bucket approach.
///
/// Limits throughput to a configurable number of requests per second by
/// combining a single-permit [`Semaphore`] with a fixed sleep interval.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` that allows at most
    /// `requests_per_second` requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval: Duration::from_millis(1000 / u64::from(requests_per_second.max(1))),
        }
    }

    /// Waits until a request slot is available, then holds the slot for
    /// the configured interval to enforce the rate limit.
    pub async fn acquire(&self) {
        // The semaphore is never closed; a closed semaphore just stops pacing.
        let _permit = self.semaphore.acquire().await.ok();
        sleep(self.interval).await;
    }
}

/// Bounded exponential-backoff retry for idempotent reads.
///
/// Only errors for which [`PlatformError::is_transient`] holds are
/// retried. A policy with `max_retries == 0` runs the operation once.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: usize,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            min_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0)
    }

    #[must_use]
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
            .with_jitter()
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    pub async fn run<T, F, Fut>(&self, platform: Platform, op: F) -> PlatformResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PlatformResult<T>>,
    {
        if self.max_retries == 0 {
            let mut op = op;
            return op().await;
        }

        op.retry(self.backoff())
            .when(PlatformError::is_transient)
            .notify(|err: &PlatformError, delay: Duration| {
                log::debug!(
                    "Retrying {} request in {:?} after: {}",
                    platform.display_name(),
                    delay,
                    err
                );
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_min_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_rate_limiter_paces_requests() {
        let limiter = RateLimiter::new(20);
        let start = std::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = fast_policy(2)
            .run(Platform::YouTube, || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(PlatformError::RateLimited {
                        platform: Platform::YouTube,
                    })
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_is_bounded() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: PlatformResult<()> = fast_policy(2)
            .run(Platform::SoundCloud, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::Http {
                    platform: Platform::SoundCloud,
                    status: 502,
                    message: "Bad Gateway".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: PlatformResult<()> = fast_policy(3)
            .run(Platform::Spotify, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::Parse {
                    platform: Platform::Spotify,
                    message: "bad json".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy_runs_once() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: PlatformResult<()> = RetryPolicy::none()
            .run(Platform::Spotify, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::RateLimited {
                    platform: Platform::Spotify,
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
