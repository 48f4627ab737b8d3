#[cfg(feature = "parking-lot")]
pub use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub use std::sync::{Mutex, MutexGuard, PoisonError};

/// Error type of [`crate::LockLeasePool`].
///
/// A `parking_lot` mutex never poisons, so with the `parking-lot` feature the
/// lock-based pool is infallible and [`crate::LeaseAllocator::acquire`] becomes
/// available.
#[cfg(feature = "parking-lot")]
pub type LockError = core::convert::Infallible;

/// Error type of [`crate::LockLeasePool`].
///
/// With `std::sync::Mutex` a panic inside the critical section poisons the
/// lock, which surfaces as [`crate::Error::LockPoisoned`].
#[cfg(not(feature = "parking-lot"))]
pub type LockError = crate::Error;
