//! Bounded retries for transient provider failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AssistantError;

/// When and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    /// Cap on any single wait, server hints included.
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_max_retries(2)
    }
}

impl RetryPolicy {
    /// Policy allowing `retries` additional attempts after the first one.
    pub fn with_max_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries + 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Policy that never retries.
    pub fn none() -> Self {
        Self::with_max_retries(0)
    }

    /// Un-jittered wait before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// A rate-limit hint from the server wins over the computed backoff.
    fn delay_for(&self, retry: u32, error: &AssistantError) -> Duration {
        match error {
            AssistantError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms).min(self.max_backoff),
            _ => jittered(self.backoff(retry)),
        }
    }

    /// Run `operation`, retrying while it fails with a retryable error.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, AssistantError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AssistantError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt, &e);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Spread `base` over 75%..125% so concurrent clients do not retry in lockstep.
fn jittered(base: Duration) -> Duration {
    let unit = (uuid::Uuid::new_v4().as_u128() % 10_000) as f64 / 10_000.0;
    base.mul_f64(0.75 + unit * 0.5)
}
