use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Runs `task` for every item on spawned tasks, at most `workers` at a time,
/// and returns the outcomes in input order.
///
/// Returning from this function is the barrier: every task has finished.
/// A task that panics yields a `JoinError` at its position.
pub async fn map_bounded<I, T, F, Fut>(
    items: I,
    workers: usize,
    task: F,
) -> Vec<Result<T, JoinError>>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let concurrent_processing = Arc::new(Semaphore::new(workers.max(1)));
    let handles = items
        .into_iter()
        .map(|item| {
            let permits = concurrent_processing.clone();
            let fut = task(item);
            tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                fut.await
            })
        })
        .collect::<Vec<_>>();

    futures::future::join_all(handles).await
}
