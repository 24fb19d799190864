//! Bounded exponential-backoff retry for upstream calls.
//!
//! Retries are scoped to a caller-declared set of transient HTTP statuses
//! (rate limiting and temporary unavailability). Other 4xx/5xx, transport
//! failures, and decode failures pass through on the first attempt.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AdapterError;

/// Exponential backoff configuration.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub base_ms: u64,
    pub factor: f64,
    /// Additive jitter: a uniform draw in `0..=jitter_ms` per attempt.
    pub jitter_ms: u64,
    pub max_ms: u64,
    pub max_attempts: usize,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: 1000,
            factor: 2.0,
            jitter_ms: 500,
            max_ms: 10_000,
            max_attempts: 3,
        }
    }
}

impl BackoffConfig {
    /// Backoff duration before retrying `attempt` (0-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        use rand::Rng;

        let base = (self.base_ms as f64 * self.factor.powi(attempt as i32))
            .min(self.max_ms as f64) as u64;
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        Duration::from_millis((base + jitter).min(self.max_ms))
    }
}

/// Retry wrapper around a single fallible upstream operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    backoff: BackoffConfig,
    transient_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn new(backoff: BackoffConfig, transient_statuses: Vec<u16>) -> Self {
        Self {
            backoff,
            transient_statuses,
        }
    }

    /// The rate-limit discipline used by the fact-check index adapter:
    /// 429/503 retried up to 3 attempts, 1 s base, ×2, +0–500 ms jitter.
    pub fn transient_http() -> Self {
        Self::new(BackoffConfig::default(), vec![429, 503])
    }

    /// Run `op`, retrying transient failures with backoff.
    ///
    /// The final error is returned once attempts are exhausted; the caller
    /// decides whether to downgrade it to "absent".
    pub async fn run<T, F, Fut>(&self, source: &str, op: F) -> Result<T, AdapterError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AdapterError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retryable = err.is_transient(&self.transient_statuses)
                        && attempt + 1 < self.backoff.max_attempts;
                    if !retryable {
                        return Err(err);
                    }
                    let delay = self.backoff.delay_for(attempt);
                    warn!(
                        source,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient upstream failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_grows_and_caps() {
        let backoff = BackoffConfig {
            jitter_ms: 0,
            ..BackoffConfig::default()
        };
        assert_eq!(backoff.delay_for(0), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(2000));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(4000));
        // Far attempts pin to the cap.
        assert_eq!(backoff.delay_for(10), Duration::from_millis(10_000));
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let backoff = BackoffConfig::default();
        for attempt in 0..3 {
            let base = (1000.0 * 2.0f64.powi(attempt)) as u64;
            let delay = backoff.delay_for(attempt as usize).as_millis() as u64;
            assert!(delay >= base.min(10_000));
            assert!(delay <= (base + 500).min(10_000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let policy = RetryPolicy::transient_http();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();

        let result = policy
            .run("test", move || {
                let calls = calls_in.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AdapterError::Status { status: 429 })
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::transient_http();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();

        let result: Result<u32, _> = policy
            .run("test", move || {
                let calls = calls_in.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AdapterError::Status { status: 503 })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let policy = RetryPolicy::transient_http();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();

        let result: Result<u32, _> = policy
            .run("test", move || {
                let calls = calls_in.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AdapterError::Status { status: 404 })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
