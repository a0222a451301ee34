//! Start independent async tasks together and collect their results in
//! input order.

use futures::future::{join_all, try_join_all};
use std::fmt::Display;
use std::future::Future;

use onereel_core::GatherPolicy;

#[derive(Debug, thiserror::Error)]
pub enum GatherError<E> {
    /// First failure observed under [`GatherPolicy::FailFast`].
    #[error("task {index} failed: {error}")]
    Failed { index: usize, error: E },

    /// Every task failed under [`GatherPolicy::BestEffort`].
    #[error("all {} tasks failed", failures.len())]
    AllFailed { failures: Vec<(usize, E)> },
}

impl<E> GatherError<E> {
    /// The underlying error; for `AllFailed`, the one from the lowest index.
    pub fn into_first_error(self) -> Option<E> {
        match self {
            GatherError::Failed { error, .. } => Some(error),
            GatherError::AllFailed { failures } => {
                failures.into_iter().next().map(|(_, error)| error)
            }
        }
    }
}

/// Run every task concurrently and return their outputs in input order,
/// regardless of completion order.
///
/// `FailFast` resolves on the first failure and drops the tasks still in
/// flight. `BestEffort` waits for all of them, skips the failures and only
/// errors when nothing succeeded. An empty input yields an empty output.
pub async fn scatter_gather<I, F, T, E>(
    tasks: I,
    policy: GatherPolicy,
) -> Result<Vec<T>, GatherError<E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match policy {
        GatherPolicy::FailFast => {
            try_join_all(tasks.into_iter().enumerate().map(|(index, task)| async move {
                task.await.map_err(|error| GatherError::Failed { index, error })
            }))
            .await
        }
        GatherPolicy::BestEffort => {
            let results = join_all(tasks).await;
            let total = results.len();
            let mut values = Vec::with_capacity(total);
            let mut failures = Vec::new();

            for (index, result) in results.into_iter().enumerate() {
                match result {
                    Ok(value) => values.push(value),
                    Err(error) => {
                        tracing::warn!(index, total, error = %error, "Gathered task failed, skipping");
                        failures.push((index, error));
                    }
                }
            }

            if values.is_empty() && !failures.is_empty() {
                return Err(GatherError::AllFailed { failures });
            }
            Ok(values)
        }
    }
}
