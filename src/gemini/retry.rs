use std::future::Future;

use crate::{
    config::RetryPolicy,
    error::{Result, RevealError},
};

/// Retry only failures that look like temporary overload.
pub fn transient_only(err: &RevealError) -> bool {
    err.is_transient()
}

/// Retry every failure.
pub fn always(_: &RevealError) -> bool {
    true
}

/// Runs `operation`, retrying with exponential backoff while `is_retryable`
/// accepts the failure and the policy has retries left. The wait before retry
/// `k + 1` is `base_delay * 2^k`. The last failure is returned unchanged.
pub async fn retry_with_backoff<T, F, Fut, P>(
    label: &str,
    policy: RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&RevealError) -> bool,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    log::info!("{} succeeded after {} retries", label, attempt);
                }
                return Ok(value);
            }
            Err(err) if attempt < policy.max_retries && is_retryable(&err) => {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{} failed ({}), retry {}/{} in {}ms",
                    label,
                    err,
                    attempt + 1,
                    policy.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                if attempt > 0 {
                    log::error!("{} failed after {} retries: {}", label, attempt, err);
                }
                return Err(err);
            }
        }
    }
}
