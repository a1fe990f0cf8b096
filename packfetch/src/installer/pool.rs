//! Admission-controlled task pool.
//!
//! Each installer stage hands its whole work list to a [`TaskPool`], which
//! admits at most `limit` futures at a time through a counting semaphore.
//! There is no batching. As soon as one task finishes, the next waiter is
//! admitted, so slow items never hold back a whole batch.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

/// Bounded executor for one stage's fan-out.
#[derive(Debug, Clone)]
pub struct TaskPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl TaskPool {
    /// Create a pool admitting up to `limit` tasks at once (at least 1).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Maximum number of concurrently admitted tasks.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run every task and collect the results in input order.
    ///
    /// Tasks are admitted in input order (the semaphore is fair) and may
    /// complete in any order. A task's future is not polled until it holds
    /// a permit.
    pub async fn run_all<I, F, T>(&self, tasks: I) -> Vec<T>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        let admitted = tasks.into_iter().map(|task| async move {
            // The semaphore is owned by the pool and never closed.
            let _permit = self.semaphore.acquire().await.ok();
            task.await
        });
        join_all(admitted).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let pool = TaskPool::new(3);
        let delays = [30u64, 5, 20, 1, 10, 0];

        let results = pool
            .run_all(delays.iter().enumerate().map(|(i, ms)| async move {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                i
            }))
            .await;

        assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let pool = TaskPool::new(4);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (active_ref, peak_ref) = (&active, &peak);

        pool.run_all((0..32).map(|_| async move {
            let active = active_ref;
            let peak = peak_ref;
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            active.fetch_sub(1, Ordering::SeqCst);
        }))
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
        assert_eq!(pool.available(), 4);
    }

    #[tokio::test]
    async fn test_zero_limit_is_clamped() {
        let pool = TaskPool::new(0);
        assert_eq!(pool.limit(), 1);

        let results = pool.run_all((0..3).map(|i| async move { i * 2 })).await;
        assert_eq!(results, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pool = TaskPool::new(2);
        let results: Vec<u32> = pool
            .run_all(Vec::<std::future::Ready<u32>>::new())
            .await;
        assert!(results.is_empty());
    }
}
