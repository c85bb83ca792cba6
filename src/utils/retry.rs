// Retry utilities for outbound API calls

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `operation` up to `max_attempts` times with exponential backoff
/// (1s, 2s, 4s, ... capped at 32s). `max_attempts` of 1 means no retry.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    max_attempts: u32,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts.max(1) {
                    return Err(error);
                }

                let delay = Duration::from_secs(2u64.pow((attempt - 1).min(5)));
                warn!(attempt, max_attempts, error = %error, ?delay, "Outbound call failed, retrying");
                sleep(delay).await;
            }
        }
    }
}
