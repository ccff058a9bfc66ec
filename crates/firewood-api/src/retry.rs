//! Retry with exponential back-off and jitter for both HTTP clients.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is
//! returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection refused or reset.
/// - [`ApiError::RateLimited`]: HTTP 429.
/// - [`ApiError::UnexpectedStatus`] with a 5xx status.
///
/// **Not retriable:** 4xx statuses, malformed bodies, missing rows and
/// configuration errors.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ApiError::RateLimited { .. } => true,
        ApiError::UnexpectedStatus { status, .. } => *status >= 500,
        ApiError::Deserialize { .. }
        | ApiError::LocationNotFound { .. }
        | ApiError::InvalidBaseUrl { .. }
        | ApiError::EmptyQuery => false,
    }
}

/// Longest wait honoured from a `Retry-After` header.
const MAX_RETRY_AFTER_MS: u64 = 60_000;
/// Cap on the computed exponential delay.
const MAX_BACKOFF_MS: u64 = 30_000;

/// Delay before retry number `attempt` (1-based) after `err`.
///
/// The exponential delay with ±25 % jitter, capped at 30 s. A 429 waits at
/// least its `Retry-After`, up to 60 s.
fn backoff_delay_ms(err: &ApiError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let computed = backoff_base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(10))
        .min(MAX_BACKOFF_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    match err {
        ApiError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs
            .saturating_mul(1000)
            .min(MAX_RETRY_AFTER_MS)
            .max(jittered),
        _ => jittered,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt    |
/// |---------|------------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter   |
/// | 2       | 500 ms × 2¹ ± 25 % jitter   |
/// | 3       | 500 ms × 2² ± 25 % jitter   |
///
/// Rate-limited responses wait for the server's `Retry-After` instead when
/// it is longer.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
