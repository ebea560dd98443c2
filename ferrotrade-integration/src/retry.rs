use std::future::Future;

use crate::error::{RetryPolicy, UpstreamError};

/// Retry `op` with exponential backoff, `base_delay * 2^attempt`, until it
/// returns `Ok`, a non-retryable `Err`, or `policy.max_retries` is exhausted.
///
/// Mirrors the whole-request retry loop a venue client runs around a single
/// call: each attempt is one full invocation of `op`, not a sub-step of it.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() || attempt == policy.max_retries => {
                return Err(UpstreamError::MaxRetries {
                    retries: attempt,
                    last: err.to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(attempt, error = %err, "retrying after transient error");
                let delay = policy.base_delay * 2u32.pow(attempt);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
