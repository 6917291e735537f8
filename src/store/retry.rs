use std::fmt::Display;
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use futures_retry_policies::tokio::RetryFutureExt;

/// Fixed-delay retry for network calls: the first attempt plus up to
/// `max_retries` more, sleeping `backoff` between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub async fn run<T, E, F, Fut>(&self, operation: &str, attempt: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        attempt.retry(FixedInterval::new(operation, *self)).await
    }
}

/// Constant backoff capped at `max_retries`, logging every retry.
struct FixedInterval<'a> {
    operation: &'a str,
    policy: RetryPolicy,
    retries: u32,
}

impl<'a> FixedInterval<'a> {
    fn new(operation: &'a str, policy: RetryPolicy) -> Self {
        Self {
            operation,
            policy,
            retries: 0,
        }
    }
}

impl<T, E: Display> futures_retry_policies::RetryPolicy<Result<T, E>> for FixedInterval<'_> {
    fn should_retry(&mut self, result: Result<T, E>) -> ControlFlow<Result<T, E>, Duration> {
        match result {
            Err(e) if self.retries < self.policy.max_retries => {
                self.retries += 1;
                tracing::warn!(
                    operation = self.operation,
                    retry = self.retries,
                    backoff_ms = self.policy.backoff.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying"
                );
                ControlFlow::Continue(self.policy.backoff)
            }
            result => ControlFlow::Break(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_on_second_attempt() {
        let calls = &AtomicU32::new(0);
        let result: Result<u32, String> = quick(1)
            .run("flaky", || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err("boom".to_string())
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_single_retry() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = quick(1)
            .run("down", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("still down".to_string())
            })
            .await;

        assert_eq!(result, Err("still down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2, "one attempt plus one retry");
    }

    #[tokio::test]
    async fn test_no_retry_policy_runs_once() {
        let calls = &AtomicU32::new(0);
        let _: Result<(), String> = RetryPolicy::new(0, Duration::ZERO)
            .run("once", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("nope".to_string())
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_is_one_retry_after_a_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }
}
