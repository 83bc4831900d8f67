// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Retry logic with exponential backoff.
//!
//! Only idempotent reads go through here, and only errors the predicate
//! accepts are retried; everything else surfaces on the first failure.
//!
//! # Example
//!
//! ```
//! use meili_connector::RetryConfig;
//! use std::time::Duration;
//!
//! let query = RetryConfig::query();
//! assert_eq!(query.max_attempts, 3);
//!
//! let none = RetryConfig::disabled();
//! assert_eq!(none.max_attempts, 1);
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Backoff settings for retried reads.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub factor: f64,
    /// Total attempts, including the first one
    pub max_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::query()
    }
}

impl RetryConfig {
    /// Quick retry for individual reads.
    /// 3 attempts with fast backoff - if it fails, let caller handle it.
    #[must_use]
    pub fn query() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }

    /// Single attempt.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::query()
        }
    }

    /// Fast retry for tests (minimal delays)
    #[must_use]
    pub fn test() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            factor: 2.0,
        }
    }

    /// Delay before the retry following `attempt` (1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 1..attempt {
            delay = grow_delay(delay, self.factor, self.max_delay);
        }
        delay.min(self.max_delay)
    }
}

/// `delay * factor`, capped at `cap`. A factor that is not finite or not
/// above 1.0 keeps the delay as it is.
pub(crate) fn grow_delay(delay: Duration, factor: f64, cap: Duration) -> Duration {
    if !factor.is_finite() || factor <= 1.0 {
        return delay.min(cap);
    }
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).map_or(cap, |grown| grown.min(cap))
}

/// Run `operation` until it succeeds, fails with an error `is_retryable`
/// rejects, or runs out of attempts.
pub async fn retry_if<F, Fut, T, E, P>(
    operation_name: &str,
    config: &RetryConfig,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(val) => {
                if attempts > 0 {
                    info!("Operation '{}' succeeded after {} retries", operation_name, attempts);
                }
                return Ok(val);
            }
            Err(err) => {
                attempts += 1;

                if attempts >= max_attempts || !is_retryable(&err) {
                    return Err(err);
                }

                let delay = config.delay_after(attempts);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}. Retrying in {:?}...",
                    operation_name, attempts, max_attempts, err, delay
                );

                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError {
        message: String,
        transient: bool,
    }

    impl TestError {
        fn transient(message: &str) -> Self {
            Self {
                message: message.to_string(),
                transient: true,
            }
        }
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_try() {
        let result: Result<i32, TestError> =
            retry_if("test_op", &RetryConfig::test(), |e: &TestError| e.transient, || async { Ok(42) }).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<i32, TestError> = retry_if(
            "test_op",
            &RetryConfig::test(),
            |e: &TestError| e.transient,
            || {
                let a = attempts_clone.clone();
                async move {
                    let count = a.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(TestError::transient(&format!("fail {}", count)))
                    } else {
                        Ok(42)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<i32, TestError> = retry_if(
            "test_op",
            &RetryConfig::test(),
            |e: &TestError| e.transient,
            || {
                let a = attempts_clone.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::transient("always fail"))
                }
            },
        )
        .await;

        assert!(result.unwrap_err().message.contains("always fail"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<i32, TestError> = retry_if(
            "test_op",
            &RetryConfig::test(),
            |e: &TestError| e.transient,
            || {
                let a = attempts_clone.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err(TestError {
                        message: "bad request".to_string(),
                        transient: false,
                    })
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_exponential_backoff() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            factor: 2.0,
            max_attempts: 5,
        };

        assert_eq!(config.delay_after(1), Duration::from_millis(100));
        assert_eq!(config.delay_after(2), Duration::from_millis(200));
        assert_eq!(config.delay_after(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_caps_at_max() {
        let config = RetryConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            factor: 10.0,
            max_attempts: 5,
        };

        assert_eq!(config.delay_after(2), Duration::from_secs(5));
        assert_eq!(config.delay_after(4), Duration::from_secs(5));
    }

    #[test]
    fn test_delay_with_unusable_factor_stays_flat() {
        for factor in [-1.0, 0.0, 0.5, f64::NAN, f64::INFINITY] {
            let config = RetryConfig {
                factor,
                ..RetryConfig::query()
            };
            assert_eq!(config.delay_after(4), Duration::from_millis(100));
        }
    }

    #[test]
    fn test_grow_delay_overflow_hits_cap() {
        let grown = grow_delay(Duration::from_secs(u64::MAX / 2), 1e300, Duration::from_secs(30));
        assert_eq!(grown, Duration::from_secs(30));
    }
}
