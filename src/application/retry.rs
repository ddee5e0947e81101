// Retry with exponential backoff
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// How many times to try, and the delay before the first retry.
/// The delay before retry `n` (counting from zero) is `base_delay * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The last error once retrying stopped
#[derive(Debug, Clone, PartialEq)]
pub struct RetryFailure<E> {
    pub error: E,
    pub attempts: u32,
    /// False when a non-retryable error ended the sequence early
    pub exhausted: bool,
}

/// Run `operation` until it succeeds, a non-retryable error occurs, or the
/// policy's attempt ceiling is reached. No sleep follows the final attempt:
/// with five attempts and a 1s base the waits are 1, 2, 4 and 8s, and the
/// 16s wait a trailing sleep would add is skipped on purpose.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: R,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                let attempts = attempt + 1;

                if !is_retryable(&error) {
                    tracing::warn!(attempts, error = %error, "non-retryable error, giving up");
                    return Err(RetryFailure { error, attempts, exhausted: false });
                }

                if attempts >= policy.max_attempts {
                    tracing::warn!(attempts, error = %error, "retry attempts exhausted");
                    return Err(RetryFailure { error, attempts, exhausted: true });
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempts,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient error, backing off"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
