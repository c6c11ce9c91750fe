use tokio::time::{sleep, Instant};

use crate::{
    config::PollPolicy,
    error::{RevealError, Result},
    gemini::backend::GenerationBackend,
    models::VideoOperation,
};

/// Waits for a submitted video job to report completion.
///
/// Status checks run strictly one after another, `policy.interval` apart.
/// Failures accepted by `is_transient` are logged and polling continues; they
/// do not count against any retry budget. Any other failure ends the poll.
/// Once more than `policy.ceiling` has passed since entry the poll fails with
/// [`RevealError::Timeout`], whatever state the job is in.
pub async fn poll_until_done<P>(
    backend: &dyn GenerationBackend,
    operation: VideoOperation,
    policy: PollPolicy,
    is_transient: P,
) -> Result<VideoOperation>
where
    P: Fn(&RevealError) -> bool,
{
    let started = Instant::now();
    let mut operation = operation;
    let mut checks: u32 = 0;

    while !operation.done {
        if started.elapsed() > policy.ceiling {
            log::error!(
                "Operation {} still running after {}s, giving up",
                operation.name,
                started.elapsed().as_secs()
            );
            return Err(RevealError::Timeout);
        }

        sleep(policy.interval).await;
        checks += 1;

        match backend.operation_status(&operation).await {
            Ok(next) => {
                log::debug!(
                    "Operation {} check {}: done={}",
                    next.name,
                    checks,
                    next.done
                );
                operation = next;
            }
            Err(err) if is_transient(&err) => {
                log::warn!(
                    "Transient error while polling {} (check {}), still waiting: {}",
                    operation.name,
                    checks,
                    err
                );
            }
            Err(err) => return Err(err),
        }
    }

    log::info!(
        "Operation {} finished after {} status checks in {}s",
        operation.name,
        checks,
        started.elapsed().as_secs()
    );
    Ok(operation)
}
