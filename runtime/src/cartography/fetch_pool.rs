//! Concurrency gate for outbound sitemap fetches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Default cap on simultaneous fetches for one resolver.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 32;

/// Bounded pool of fetch slots.
///
/// Only the fetch itself holds a slot. Callers must not hold a permit while
/// waiting on work that needs another permit.
pub struct FetchPool {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl FetchPool {
    /// Create a pool allowing `max_concurrent` fetches at once (minimum 1).
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<FetchPermit, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        Ok(FetchPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Fetches currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous fetches observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

impl Default for FetchPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_FETCHES)
    }
}

/// Slot held for the duration of one fetch; released on drop.
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let pool = FetchPool::new(2);
        let g1 = pool.acquire().await.unwrap();
        let _g2 = pool.acquire().await.unwrap();
        assert_eq!(pool.in_flight(), 2);
        drop(g1);
        assert_eq!(pool.in_flight(), 1);
        assert_eq!(pool.peak(), 2);
    }

    #[tokio::test]
    async fn test_zero_is_clamped_to_one() {
        let pool = FetchPool::new(0);
        assert_eq!(pool.max_concurrent(), 1);
        let _g = pool.acquire().await.unwrap();
    }

    #[tokio::test]
    async fn test_blocks_when_full() {
        let pool = Arc::new(FetchPool::new(1));
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap().unwrap();
        assert_eq!(pool.peak(), 1);
    }
}
