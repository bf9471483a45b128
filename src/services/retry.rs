use std::future::Future;
use std::time::Duration as StdDuration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::AppResult;

/// Exponential backoff for transient backend failures.
///
/// Only errors reporting [`crate::error::AppError::is_transient`] are retried; everything
/// else is returned on the first attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: StdDuration,
    pub max_delay: StdDuration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: StdDuration::from_millis(250),
            max_delay: StdDuration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based), capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> StdDuration {
        if attempt == 0 {
            return StdDuration::ZERO;
        }
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        let secs = self.base_delay.as_secs_f64() * factor;
        StdDuration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    pub async fn execute<F, Fut, T>(&self, operation: &str, mut call: F) -> AppResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match call(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(target: "app::retry", operation, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if !error.is_transient() => return Err(error),
                Err(error) if attempt >= max_attempts => {
                    warn!(
                        target: "app::retry",
                        operation,
                        attempts = attempt,
                        error = %error,
                        "giving up after transient failures"
                    );
                    return Err(error);
                }
                Err(error) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        target: "app::retry",
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient failure, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
