//! Retry logic.
//!
//! # Responsibilities
//! - Re-run an upstream attempt until it succeeds or the ceiling is reached
//! - Annotate every envelope with the retry counter
//!
//! # Design Decisions
//! - Fixed pause between attempts (no exponential growth, no jitter)
//! - Every failed attempt pauses, the final one included, so an exhausted
//!   invocation takes `max_attempts` pauses
//! - On exhaustion the last failing envelope is returned unchanged

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::invocation::envelope::ResponseEnvelope;
use crate::observability::metrics;
use crate::upstream::Outcome;

/// Bounded, fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.backoff_ms))
    }

    /// Total attempts allowed (first try plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `attempt` until it succeeds or the retry ceiling is reached.
    ///
    /// `attempt` receives the current retry counter, starting at 0.
    pub async fn run<F, Fut>(&self, mut attempt: F) -> ResponseEnvelope
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let mut retries = 0;

        loop {
            let outcome = attempt(retries).await;
            metrics::record_attempt(outcome.success);
            let envelope = outcome.envelope.with_retries(retries);

            if outcome.success {
                tracing::debug!(
                    retries,
                    status = envelope.status_code,
                    "Upstream attempt succeeded"
                );
                return envelope;
            }

            tracing::warn!(
                retries,
                status = envelope.status_code,
                delay = ?self.backoff,
                "Upstream attempt failed"
            );
            tokio::time::sleep(self.backoff).await;

            if retries >= self.max_retries {
                tracing::warn!(
                    retries,
                    status = envelope.status_code,
                    "Upstream attempts exhausted"
                );
                return envelope;
            }

            retries += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn failing() -> Outcome {
        Outcome::failure(ResponseEnvelope::message(503, "Bad response from GLZ API: 500"))
    }

    fn succeeding() -> Outcome {
        Outcome::success(ResponseEnvelope::message(200, "ok"))
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let envelope = RetryPolicy::default()
            .run(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                async { succeeding() }
            })
            .await;

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.retries(), Some(0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let start = Instant::now();

        let envelope = RetryPolicy::default()
            .run(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                async { failing() }
            })
            .await;

        assert_eq!(envelope.status_code, 503);
        assert_eq!(envelope.retries(), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // One 100ms pause after each of the four failures.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(400));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures() {
        let envelope = RetryPolicy::default()
            .run(|retries| async move {
                if retries < 2 {
                    failing()
                } else {
                    succeeding()
                }
            })
            .await;

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.retries(), Some(2));
    }

    #[tokio::test]
    async fn test_zero_retries() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100));
        assert_eq!(policy.max_attempts(), 1);

        let envelope = policy.run(|_| async { failing() }).await;
        assert_eq!(envelope.retries(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_failure_still_pauses() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100));
        let start = Instant::now();

        let envelope = policy.run(|_| async { failing() }).await;

        assert_eq!(envelope.status_code, 503);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
