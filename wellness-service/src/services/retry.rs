//! Retry policy for outbound provider calls.
//!
//! The default is a single attempt: a failed call is turned into fallback
//! text straight away. Retries only happen when configured explicitly.

use super::providers::ProviderError;
use backoff::future::retry_notify;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Jitter as a fraction of the interval, 0.0 disables it.
    pub randomization_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            randomization_factor: 0.25,
        }
    }

    pub fn with_max_retries(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            ..Self::no_retry()
        }
    }

    /// Attempts are bounded by `max_retries`, not by elapsed time.
    fn exponential_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_multiplier(self.backoff_multiplier)
            .with_randomization_factor(self.randomization_factor)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run a provider call, retrying retryable failures per `config`.
pub async fn retry_provider_call<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    f: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_retries = config.max_retries;
    let mut attempts: u32 = 0;

    let result = retry_notify(
        config.exponential_backoff(),
        || {
            let attempt = attempts;
            attempts += 1;
            let call = f();
            async move {
                call.await.map_err(|err| {
                    if err.is_retryable() && attempt < max_retries {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        },
        |err: ProviderError, wait: Duration| {
            tracing::warn!(
                operation = operation_name,
                error = %err,
                backoff_ms = wait.as_millis() as u64,
                "Provider call failed, retrying after backoff"
            );
        },
    )
    .await;

    if result.is_ok() && attempts > 1 {
        tracing::info!(
            operation = operation_name,
            attempts,
            "Provider call succeeded after retry"
        );
    }

    result
}
