use std::future::Future;

use futures::future::join_all;
use tracing::warn;

use crate::Error;
use crate::Result;

/// Runs every task to completion and fails with the first error in input
/// order.
///
/// Unlike `try_join_all`, no task is dropped early, so the caller can inspect
/// the outcome of the whole batch before cleaning up.
pub(crate) async fn join_all_or_first_error<I, F>(tasks: I) -> Result<()>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<()>>,
{
    let mut first = None;
    for result in join_all(tasks).await {
        if let Err(e) = result {
            if first.is_none() {
                first = Some(e);
            } else {
                warn!("additional failure in batch: {}", e);
            }
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Runs every task to completion and collects all failures.
///
/// Returns [`Error::PartialFailure`] when at least one task failed.
pub(crate) async fn join_all_best_effort<I, F>(
    operation: &'static str,
    tasks: I,
) -> Result<()>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<()>>,
{
    let failures: Vec<Error> = join_all(tasks).await.into_iter().filter_map(|r| r.err()).collect();

    if failures.is_empty() {
        return Ok(());
    }

    warn!(operation, failed = failures.len(), "batch finished with failures");
    Err(Error::PartialFailure { operation, failures })
}
