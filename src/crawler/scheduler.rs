//! Bounded worker pool for page fetch tasks
//!
//! Tasks are spawned onto a `JoinSet` immediately but wait on a shared
//! semaphore before doing any work, so at most `workers` run at once. Each
//! task runs in its own inner task so a panic is reported against the key it
//! was spawned with instead of being lost.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Semaphore-bounded fan-out of keyed tasks
pub struct WorkerPool<K, T> {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<(K, Result<T, String>)>,
}

impl<K, T> WorkerPool<K, T>
where
    K: Send + 'static,
    T: Send + 'static,
{
    /// Creates a pool running at most `workers` tasks at a time
    pub fn new(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            tasks: JoinSet::new(),
        }
    }

    /// Number of tasks spawned and not yet collected
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Queues a task identified by `key`
    pub fn spawn<F>(&mut self, key: K, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        self.tasks.spawn(async move {
            // The semaphore is never closed; a missing permit only loosens the bound
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = tokio::spawn(task).await.map_err(|e| {
                if e.is_panic() {
                    "worker task panicked".to_string()
                } else {
                    "worker task was cancelled".to_string()
                }
            });
            (key, outcome)
        });
    }

    /// Waits for every task and returns the outcomes in completion order
    pub async fn join_all(mut self) -> Vec<(K, Result<T, String>)> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                // The wrapper itself does not panic
                Err(e) => tracing::error!("Worker wrapper failed: {}", e),
            }
        }
        outcomes
    }
}
