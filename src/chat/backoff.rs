//! Reconnect backoff.
//!
//! Delays grow as `base * 2^attempt` with no per-attempt cap; the number of
//! attempts is bounded by `max_retries` instead.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Exponential backoff bounded by a retry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max_retries: u32,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max_retries: u32) -> Self {
        Self { base, max_retries }
    }

    /// Delay before the attempt made after `retries` failures.
    pub fn delay_for(&self, retries: u32) -> Duration {
        let factor = 1u32.checked_shl(retries).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    pub fn is_exhausted(&self, retries: u32) -> bool {
        retries >= self.max_retries
    }
}

/// Retry `attempt` until it succeeds, the policy is exhausted, or `token`
/// is cancelled.
///
/// `retries` carries the failure count across calls and is reset to zero
/// on success. Each attempt is preceded by its backoff delay.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    retries: &mut u32,
    token: &CancellationToken,
    mut attempt: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    while !policy.is_exhausted(*retries) {
        let delay = policy.delay_for(*retries);
        debug!(retry = *retries + 1, delay_ms = delay.as_millis() as u64, "Backing off");

        tokio::select! {
            _ = token.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }
        *retries += 1;

        match attempt().await {
            Ok(value) => {
                *retries = 0;
                return Some(value);
            }
            Err(e) => {
                warn!(
                    retry = *retries,
                    max_retries = policy.max_retries,
                    error = %e,
                    "Reconnect attempt failed"
                );
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    #[test]
    fn test_delay_doubles() {
        let policy = BackoffPolicy::new(Duration::from_millis(200), 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for(2), Duration::from_millis(800));
        assert_eq!(policy.delay_for(40), Duration::from_millis(200).saturating_mul(u32::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_then_give_up() {
        let policy = BackoffPolicy::new(Duration::from_millis(200), 3);
        let token = CancellationToken::new();
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();
        let mut retries = 0;

        let result: Option<()> = retry_with_backoff(&policy, &mut retries, &token, || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.lock().push(start.elapsed());
                Err::<(), _>("refused")
            }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(retries, 3);
        let attempts = attempts.lock();
        assert_eq!(attempts.len(), 3);
        let gaps = [
            attempts[0],
            attempts[1] - attempts[0],
            attempts[2] - attempts[1],
        ];
        for (gap, expected_ms) in gaps.iter().zip([200u64, 400, 800]) {
            let expected = Duration::from_millis(expected_ms);
            assert!(
                *gap >= expected && *gap < expected + Duration::from_millis(5),
                "gap {gap:?}, expected {expected:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_counter() {
        let policy = BackoffPolicy::new(Duration::from_millis(200), 3);
        let token = CancellationToken::new();
        let mut retries = 1;
        let mut calls = 0;

        let result = retry_with_backoff(&policy, &mut retries, &token, || {
            calls += 1;
            let ok = calls == 2;
            async move { if ok { Ok(7) } else { Err("refused") } }
        })
        .await;

        assert_eq!(result, Some(7));
        assert_eq!(retries, 0);
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_waiting() {
        let policy = BackoffPolicy::new(Duration::from_secs(60), 3);
        let token = CancellationToken::new();
        token.cancel();
        let mut retries = 0;

        let result: Option<()> =
            retry_with_backoff(&policy, &mut retries, &token, || async { Err::<(), _>("x") }).await;

        assert!(result.is_none());
        assert_eq!(retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_policy_does_not_attempt() {
        let policy = BackoffPolicy::new(Duration::from_millis(200), 3);
        let token = CancellationToken::new();
        let mut retries = 3;
        let mut called = false;

        let result: Option<()> = retry_with_backoff(&policy, &mut retries, &token, || {
            called = true;
            async { Ok::<(), &str>(()) }
        })
        .await;

        assert!(result.is_none());
        assert!(!called);
    }
}
