//! Async retry utilities with exponential backoff

use std::time::Duration;

/// Default maximum attempts for storage writes
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay in milliseconds for exponential backoff
pub const DEFAULT_BASE_DELAY_MS: u64 = 50;

/// Retry an async operation with exponential backoff while its error is transient.
///
/// Returns the operation's value, or `Err((error, attempts))` once attempts run
/// out or a non-transient error occurs.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    max_attempts: u32,
    base_delay_ms: u64,
    is_transient: P,
    mut operation: F,
) -> Result<T, (E, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    tracing::debug!(attempts, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if attempts >= max_attempts || !is_transient(&e) {
                    return Err((e, attempts));
                }
                let delay = Duration::from_millis(base_delay_ms * 2_u64.pow(attempts - 1));
                tracing::warn!(
                    error = %e,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Retrying after transient error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
