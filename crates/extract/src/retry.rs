use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ChunkError;

/// Source of the waits between attempts and between requests.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock waits.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    parse_backoff: Duration,
    rate_limit_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: usize,
        parse_backoff_ms: u64,
        rate_limit_backoff_ms: u64,
        max_backoff_ms: u64,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            parse_backoff: Duration::from_millis(parse_backoff_ms),
            rate_limit_backoff: Duration::from_millis(rate_limit_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Wait after the given failed attempt (0-based), or `None` when the
    /// error is not worth retrying.
    pub fn backoff_for(&self, error: &ChunkError, attempt: usize) -> Option<Duration> {
        let base = match error {
            ChunkError::ChunkParseFailure(_) => self.parse_backoff,
            ChunkError::RateLimited(_) => self.rate_limit_backoff,
            _ => return None,
        };

        let factor = 2u32.saturating_pow(attempt as u32);
        Some(std::cmp::min(base.saturating_mul(factor), self.max_backoff))
    }

    /// Retry an attempt with exponential backoff.
    ///
    /// Parse failures and rate limits are retried up to `max_attempts`;
    /// every other error is returned at once. There is no wait after the
    /// final attempt.
    pub async fn retry<F, Fut, T>(
        &self,
        operation_name: &str,
        delay: &dyn Delay,
        mut f: F,
    ) -> Result<T, ChunkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ChunkError>>,
    {
        let mut attempt = 0;

        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(result);
                }
                Err(e) => {
                    let Some(backoff) = self.backoff_for(&e, attempt) else {
                        return Err(e);
                    };

                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %e,
                            "Operation failed after max retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Operation failed, retrying"
                    );

                    delay.sleep(backoff).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1_000, 16_000, 300_000)
    }
}
