use core::{fmt, time::Duration};

use crate::{decision::Decision, state::LeaseState, time::TimeSource};

/// A minimal interface over lease pools.
///
/// Implementations differ only in how they guard the underlying
/// [`LeaseTable`](crate::LeaseTable); the allocation rules are identical.
pub trait LeaseAllocator<I> {
    /// The error type returned by the fallible methods.
    type Err: fmt::Debug;

    /// Total number of identifiers in the pool.
    fn capacity(&self) -> usize;

    /// Attempts to lease `amount` identifiers for `duration` at `now`.
    ///
    /// The returned [`Decision`] is either:
    /// - [`Decision::Granted`] with the leased identifiers,
    /// - [`Decision::Deferred`] with the number of seconds to wait, or
    /// - [`Decision::InvalidRequest`] when `amount` is zero.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying implementation uses a lock and it
    /// is poisoned.
    fn try_acquire(
        &self,
        amount: usize,
        duration: Duration,
        now: u64,
    ) -> Result<Decision<I>, Self::Err>;

    /// Returns the number of free identifiers at `now`.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying lock is poisoned.
    fn try_free_count(&self, now: u64) -> Result<usize, Self::Err>;

    /// Returns every identifier with its state at `now`, in pool order.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying lock is poisoned.
    fn try_snapshot(&self, now: u64) -> Result<Vec<(I, LeaseState)>, Self::Err>;

    /// Like [`LeaseAllocator::try_acquire`], reading `now` from `time`.
    ///
    /// # Errors
    ///
    /// May return an error if the underlying lock is poisoned.
    fn try_acquire_now<T>(
        &self,
        amount: usize,
        duration: Duration,
        time: &T,
    ) -> Result<Decision<I>, Self::Err>
    where
        T: TimeSource + ?Sized,
    {
        self.try_acquire(amount, duration, time.current_millis())
    }

    /// Leases `amount` identifiers for `duration` at `now`.
    ///
    /// This is the infallible counterpart to
    /// [`LeaseAllocator::try_acquire`], available when [`Self::Err`] cannot
    /// be constructed.
    fn acquire(&self, amount: usize, duration: Duration, now: u64) -> Decision<I>
    where
        Self::Err: Into<core::convert::Infallible>,
    {
        match self.try_acquire(amount, duration, now) {
            Ok(decision) => decision,
            Err(e) => {
                #[allow(unreachable_code)]
                // `into()` satisfies the trait bound at compile time.
                match e.into() {}
            }
        }
    }
}
