//! Waiting for the database service to come up
//!
//! A freshly started emulator refuses connections for a while. When a retry
//! limit is configured, connection failures are retried with an interval that
//! halves after every failure; any other error is returned at once.

use std::future::Future;
use std::iter;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::WaitConfig;
use crate::error::ServiceError;

/// How long to keep trying to reach the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Retries after the first attempt; 0 disables waiting
    pub retry_limit: u32,

    /// Delay before the first retry
    pub interval: Duration,
}

impl ReadinessPolicy {
    pub fn new(retry_limit: u32, interval: Duration) -> Self {
        Self {
            retry_limit,
            interval,
        }
    }

    /// Single attempt, no waiting
    pub fn no_wait() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delays between attempts, halving each time
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        iter::successors(Some(self.interval), |d| Some(*d / 2)).take(self.retry_limit as usize)
    }
}

impl From<&WaitConfig> for ReadinessPolicy {
    fn from(wait: &WaitConfig) -> Self {
        Self::new(wait.retries, wait.interval())
    }
}

/// Run `attempt` until it succeeds, retrying only connection failures.
pub async fn wait_for_service<T, F, Fut>(
    policy: &ReadinessPolicy,
    mut attempt: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut delays = policy.delays();
    let mut failures = 0u32;

    loop {
        match attempt().await {
            Ok(value) => {
                if failures > 0 {
                    tracing::info!(failures, "Database service reachable");
                }
                return Ok(value);
            }
            Err(e) if e.is_connection() => {
                failures += 1;
                let Some(delay) = delays.next() else {
                    if policy.retry_limit > 0 {
                        tracing::error!(
                            retry_limit = policy.retry_limit,
                            error = %e,
                            "Unable to reach database service, giving up"
                        );
                    }
                    return Err(e);
                };

                tracing::warn!(
                    attempt = failures,
                    retry_limit = policy.retry_limit,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Database service not reachable yet"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delays_halve() {
        let policy = ReadinessPolicy::new(3, Duration::from_secs(40));
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(40),
                Duration::from_secs(20),
                Duration::from_secs(10)
            ]
        );
        assert_eq!(ReadinessPolicy::no_wait().delays().count(), 0);
    }

    #[test]
    fn test_policy_from_wait_config() {
        let wait = WaitConfig {
            retries: 2,
            interval_seconds: 8,
        };
        assert_eq!(
            ReadinessPolicy::from(&wait),
            ReadinessPolicy::new(2, Duration::from_secs(8))
        );
    }

    #[tokio::test]
    async fn test_connection_failures_are_retried() {
        let policy = ReadinessPolicy::new(3, Duration::from_millis(4));
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = wait_for_service(&policy, || {
            let calls = calls_clone.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ServiceError::Connection("refused".into()))
                } else {
                    Ok("ready")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_limit() {
        let policy = ReadinessPolicy::new(2, Duration::from_millis(2));
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<(), _> = wait_for_service(&policy, || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Connection("refused".into()))
            }
        })
        .await;

        assert!(result.unwrap_err().is_connection());
        // Initial attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unauthorized_is_never_retried() {
        let policy = ReadinessPolicy::new(5, Duration::from_millis(1));
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<(), _> = wait_for_service(&policy, || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Unauthorized("bad key".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_wait_makes_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<(), _> = wait_for_service(&ReadinessPolicy::no_wait(), || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Connection("refused".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
