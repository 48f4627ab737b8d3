use core::{cell::RefCell, convert::Infallible, hash::Hash, time::Duration};

use crate::{
    decision::Decision,
    error::Result,
    pool::{LeaseAllocator, LeaseTable},
    state::LeaseState,
};

/// A non-concurrent lease pool suitable for single-threaded environments.
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ No locking overhead
///
/// ## Recommended When
/// - A single task owns the pool (tests, simulations, actor-owned state)
///
/// ## See Also
/// - [`LockLeasePool`]
///
/// [`LockLeasePool`]: crate::LockLeasePool
#[derive(Debug)]
pub struct BasicLeasePool<I> {
    table: RefCell<LeaseTable<I>>,
}

impl<I> BasicLeasePool<I>
where
    I: Clone + Eq + Hash,
{
    /// Creates a pool over `ids`, all initially free.
    ///
    /// # Errors
    ///
    /// See [`LeaseTable::new`].
    pub fn new(ids: impl IntoIterator<Item = I>) -> Result<Self> {
        LeaseTable::new(ids).map(Self::from_table)
    }

    /// Wraps an existing table.
    pub fn from_table(table: LeaseTable<I>) -> Self {
        Self {
            table: RefCell::new(table),
        }
    }

    /// State of `id` at `now`, or `None` if `id` is not in the pool.
    pub fn state_of(&self, id: &I, now: u64) -> Option<LeaseState> {
        self.table.borrow_mut().state_of(id, now)
    }

    /// Consumes the pool and returns its table.
    pub fn into_table(self) -> LeaseTable<I> {
        self.table.into_inner()
    }
}

impl<I> LeaseAllocator<I> for BasicLeasePool<I>
where
    I: Clone + Eq + Hash,
{
    type Err = Infallible;

    fn capacity(&self) -> usize {
        self.table.borrow().capacity()
    }

    fn try_acquire(
        &self,
        amount: usize,
        duration: Duration,
        now: u64,
    ) -> Result<Decision<I>, Self::Err> {
        Ok(self.table.borrow_mut().acquire(amount, duration, now))
    }

    fn try_free_count(&self, now: u64) -> Result<usize, Self::Err> {
        Ok(self.table.borrow_mut().free_count(now))
    }

    fn try_snapshot(&self, now: u64) -> Result<Vec<(I, LeaseState)>, Self::Err> {
        Ok(self.table.borrow_mut().snapshot(now))
    }
}
