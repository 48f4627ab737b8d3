use core::{hash::Hash, time::Duration};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    decision::Decision,
    error::Result,
    mutex::{LockError, Mutex, MutexGuard},
    pool::{LeaseAllocator, LeaseTable},
    state::LeaseState,
};

/// A lock-based lease pool suitable for multi-threaded environments.
///
/// This pool wraps its [`LeaseTable`] in an [`Arc<Mutex<_>>`]. Cloning the
/// pool yields another handle to the same table, so it can be handed to every
/// request handler that needs it.
///
/// The mutex is held for the whole of one acquisition: expiring stale leases,
/// counting free identifiers, and leasing them happen as one step. Two callers
/// can therefore never both receive the same identifier, and no caller
/// observes the table half-reconciled.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Cheap to clone and share
///
/// ## Recommended When
/// - Many request handlers allocate from the same pool
///
/// ## See Also
/// - [`BasicLeasePool`]
///
/// [`BasicLeasePool`]: crate::BasicLeasePool
#[derive(Debug)]
pub struct LockLeasePool<I> {
    table: Arc<Mutex<LeaseTable<I>>>,
    capacity: usize,
}

impl<I> Clone for LockLeasePool<I> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            capacity: self.capacity,
        }
    }
}

impl<I> LockLeasePool<I>
where
    I: Clone + Eq + Hash,
{
    /// Creates a pool over `ids`, all initially free.
    ///
    /// # Example
    /// ```
    /// use core::time::Duration;
    /// use leasepool::{Decision, LeaseAllocator, LockLeasePool};
    ///
    /// let pool = LockLeasePool::new(1..=4).unwrap();
    /// let handle = pool.clone();
    ///
    /// let decision = std::thread::spawn(move || {
    ///     handle.try_acquire(3, Duration::from_secs(60), 0).unwrap()
    /// })
    /// .join()
    /// .unwrap();
    /// assert_eq!(decision, Decision::Granted { identifiers: vec![1, 2, 3] });
    ///
    /// // Only one identifier is left; all three leases end 60s from now.
    /// let decision = pool.try_acquire(2, Duration::from_secs(60), 0).unwrap();
    /// assert_eq!(decision, Decision::Deferred { come_back_in: 60 });
    /// ```
    ///
    /// # Errors
    ///
    /// See [`LeaseTable::new`].
    pub fn new(ids: impl IntoIterator<Item = I>) -> Result<Self> {
        LeaseTable::new(ids).map(Self::from_table)
    }

    /// Wraps an existing table.
    pub fn from_table(table: LeaseTable<I>) -> Self {
        let capacity = table.capacity();
        Self {
            table: Arc::new(Mutex::new(table)),
            capacity,
        }
    }

    /// State of `id` at `now`, or `None` if `id` is not in the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock has been poisoned.
    pub fn try_state_of(&self, id: &I, now: u64) -> Result<Option<LeaseState>, LockError> {
        Ok(self.lock()?.state_of(id, now))
    }

    fn lock(&self) -> Result<MutexGuard<'_, LeaseTable<I>>, LockError> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.table.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.table.lock()?)
        }
    }
}

impl<I> LeaseAllocator<I> for LockLeasePool<I>
where
    I: Clone + Eq + Hash,
{
    type Err = LockError;

    fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn try_acquire(
        &self,
        amount: usize,
        duration: Duration,
        now: u64,
    ) -> Result<Decision<I>, Self::Err> {
        let mut table = self.lock()?;
        Ok(table.acquire(amount, duration, now))
    }

    fn try_free_count(&self, now: u64) -> Result<usize, Self::Err> {
        Ok(self.lock()?.free_count(now))
    }

    fn try_snapshot(&self, now: u64) -> Result<Vec<(I, LeaseState)>, Self::Err> {
        Ok(self.lock()?.snapshot(now))
    }
}
