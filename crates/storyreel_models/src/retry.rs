//! Exponential backoff for transient provider failures.

use std::future::Future;
use std::time::Duration;
use storyreel_config::RetrySettings;
use storyreel_error::{ProviderError, StoryreelError, StoryreelResult};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

/// Backoff parameters shared by every adapter of one pipeline.
///
/// # Examples
///
/// ```
/// use storyreel_models::RetryPolicy;
///
/// let policy = RetryPolicy::new(500, 4, 30);
/// assert_eq!(*policy.max_retries(), 4);
/// assert_eq!(*RetryPolicy::no_retry().max_retries(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct RetryPolicy {
    /// First backoff delay in milliseconds
    initial_backoff_ms: u64,
    /// Retries after the first attempt
    max_retries: usize,
    /// Cap on a single delay in seconds
    max_delay_secs: u64,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(initial_backoff_ms: u64, max_retries: usize, max_delay_secs: u64) -> Self {
        Self {
            initial_backoff_ms,
            max_retries,
            max_delay_secs,
        }
    }

    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self::new(0, 0, 0)
    }

    /// Policy from the `[retry]` configuration section.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.initial_backoff_ms,
            settings.max_retries,
            settings.max_delay_secs,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

/// Run `action` until it succeeds, fails permanently, or the policy is
/// exhausted. Only errors whose kind reports `is_retryable()` are retried.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut action: F,
) -> StoryreelResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let strategy = ExponentialBackoff::from_millis(policy.initial_backoff_ms.max(1))
        .factor(2)
        .max_delay(Duration::from_secs(policy.max_delay_secs.max(1)))
        .map(jitter)
        .take(policy.max_retries);

    Retry::spawn(strategy, || {
        let attempt = action();
        async move {
            match attempt.await {
                Ok(value) => Ok(value),
                Err(e) if e.kind.is_retryable() => {
                    warn!(operation, error = %e, "Transient provider failure, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(operation, error = %e, "Permanent provider failure, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        }
    })
    .await
    .map_err(StoryreelError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storyreel_error::ProviderErrorKind;

    fn status(code: u16) -> ProviderError {
        ProviderError::new(ProviderErrorKind::Status {
            provider: "test".to_string(),
            status_code: code,
            message: "boom".to_string(),
        })
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::new(1, 3, 1);

        let value = with_retry(&policy, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(status(503)) } else { Ok(n) } }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_fail_immediately() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::new(1, 3, 1);

        let err = with_retry(&policy, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(status(401)) }
        })
        .await
        .unwrap_err();

        assert!(err.is_provider());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy_makes_one_attempt() {
        let calls = AtomicUsize::new(0);

        let result = with_retry(&RetryPolicy::no_retry(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(status(429)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
