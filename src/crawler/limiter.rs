//! Admission gate for concurrent profile work
//!
//! Wraps a fair tokio semaphore: at most `capacity` scheduled tasks run at
//! once and waiting tasks are admitted in the order they first asked for a
//! slot. Clones share the same slots.

use crate::HarvestError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot, runs `task` to completion, then frees the slot
    ///
    /// `task` is not polled before a slot is granted.
    pub async fn schedule<F, T>(&self, task: F) -> Result<T, HarvestError>
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| HarvestError::LimiterClosed)?;
        Ok(task.await)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held by a running task
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
