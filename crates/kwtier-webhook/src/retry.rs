//! Linear back-off retry for webhook delivery.
//!
//! Every failure is retried: network errors, unparseable bodies, non-2xx
//! statuses and replies that fail validation all count as one failed attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::DeliveryError;

/// Wait before the attempt that follows failed attempt number `attempt` (1-based).
///
/// With `base_delay_ms = 1_000` this is 1 000 ms after the first failure,
/// 2 000 ms after the second, and so on. No jitter and no cap.
pub(crate) fn backoff_delay_ms(base_delay_ms: u64, attempt: u32) -> u64 {
    base_delay_ms.saturating_mul(u64::from(attempt))
}

/// Runs `operation` up to `max_attempts` times (at least once).
///
/// `operation` receives the 1-based attempt number. When the final attempt
/// fails, the last error's status and body are carried into a single error
/// whose message names the attempt count.
pub(crate) async fn retry_linear<T, F, Fut>(
    max_attempts: u32,
    base_delay_ms: u64,
    mut operation: F,
) -> Result<T, DeliveryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, DeliveryError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    status = ?err.status_code,
                    body = ?err.response_body,
                    error = %err,
                    "webhook attempt failed"
                );
                if attempt >= max_attempts {
                    let final_err = DeliveryError {
                        message: format!(
                            "Failed to send data to webhook after {max_attempts} attempts: {}",
                            err.message
                        ),
                        status_code: err.status_code,
                        response_body: err.response_body,
                    };
                    tracing::error!(
                        status = ?final_err.status_code,
                        error = %final_err,
                        "all webhook attempts failed"
                    );
                    return Err(final_err);
                }
                let delay_ms = backoff_delay_ms(base_delay_ms, attempt);
                tracing::info!(attempt, delay_ms, "retrying webhook delivery after back-off");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
