/// Wait reported when a request asks for more identifiers than the pool will
/// ever hold.
///
/// Such a request can never be granted, so the come-back time is the largest
/// representable number of seconds.
pub const NEVER: u64 = u64::MAX;

/// Represents the outcome of a single lease acquisition.
///
/// This type models the result of [`LeaseAllocator::try_acquire`]:
///
/// - [`Decision::Granted`] carries the identifiers that were leased.
/// - [`Decision::Deferred`] means too few identifiers are free right now and
///   nothing was leased. `come_back_in` is the number of whole seconds until
///   enough leases will have expired.
/// - [`Decision::InvalidRequest`] means the request itself was malformed.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use leasepool::{BasicLeasePool, Decision, LeaseAllocator};
///
/// let pool = BasicLeasePool::new(["a", "b"]).unwrap();
/// match pool.acquire(1, Duration::from_secs(30), 0) {
///     Decision::Granted { identifiers } => println!("leased: {identifiers:?}"),
///     Decision::Deferred { come_back_in } => println!("retry in {come_back_in}s"),
///     Decision::InvalidRequest { reason } => println!("rejected: {reason}"),
/// }
/// ```
///
/// [`LeaseAllocator::try_acquire`]: crate::LeaseAllocator::try_acquire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Decision<I> {
    /// Every requested identifier was leased.
    Granted {
        /// The leased identifiers, in pool order.
        identifiers: Vec<I>,
    },
    /// The request cannot be satisfied yet. No identifier was leased.
    Deferred {
        /// Whole seconds until enough identifiers are free, or [`NEVER`].
        come_back_in: u64,
    },
    /// The request was malformed and left the pool untouched.
    InvalidRequest {
        /// Human readable cause.
        reason: String,
    },
}

impl<I> Decision<I> {
    /// Returns `true` for [`Decision::Granted`].
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The leased identifiers, empty unless the decision is a grant.
    pub fn identifiers(&self) -> &[I] {
        match self {
            Self::Granted { identifiers } => identifiers,
            _ => &[],
        }
    }

    /// The come-back time of a deferral.
    pub const fn come_back_in(&self) -> Option<u64> {
        match self {
            Self::Deferred { come_back_in } => Some(*come_back_in),
            _ => None,
        }
    }

    /// Returns `true` when the request could never be granted by this pool.
    pub const fn is_unsatisfiable(&self) -> bool {
        match self {
            Self::Deferred { come_back_in } => *come_back_in == NEVER,
            _ => false,
        }
    }
}
