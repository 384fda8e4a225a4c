/// Bounded retry with exponential backoff for outbound HTTP calls
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::warn;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Multiplier applied to the delay after every retry
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(400),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(millis.min(self.max_backoff.as_millis() as f64) as u64)
    }
}

/// Rate limiting and gateway-style server errors are worth another attempt
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Sends the request produced by `make_request`, retrying transient failures
///
/// Client errors and successful responses return immediately. A non-success
/// status that survives all retries becomes `AppError::ExternalApi`.
pub async fn send_with_retry<F>(policy: &RetryPolicy, mut make_request: F) -> AppResult<Response>
where
    F: FnMut() -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let outcome = make_request().send().await;

        let retryable = match &outcome {
            Ok(response) => is_retryable_status(response.status()),
            Err(e) => is_retryable_error(e),
        };

        if !retryable || attempt >= policy.max_retries {
            return match outcome {
                Ok(response) if response.status().is_success() => Ok(response),
                Ok(response) => Err(AppError::ExternalApi(format!(
                    "{} returned status {}",
                    response.url().path(),
                    response.status()
                ))),
                Err(e) => Err(e.into()),
            };
        }

        attempt += 1;
        let delay = policy.backoff_for(attempt);
        warn!(
            attempt,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            "Transient upstream failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
