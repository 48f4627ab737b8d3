use core::fmt;

/// A result type that defaults to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `leasepool` can emit.
///
/// Business outcomes such as "not enough identifiers free" are never errors;
/// they are reported through [`crate::Decision`]. The variants here cover
/// pool construction and lock failures only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Error {
    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the pool lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    LockPoisoned,

    /// A pool was constructed from an empty identifier set.
    EmptyPool,

    /// The identifier at `index` already appeared earlier in the set.
    DuplicateIdentifier {
        /// Zero-based position of the repeated identifier.
        index: usize,
    },

    /// An address range ran past the end of the IPv4 space.
    AddressRangeOverflow {
        /// Number of addresses that were requested.
        count: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            #[cfg(not(feature = "parking-lot"))]
            Self::LockPoisoned => write!(fmt, "lease pool lock poisoned"),
            Self::EmptyPool => write!(fmt, "lease pool must hold at least one identifier"),
            Self::DuplicateIdentifier { index } => {
                write!(fmt, "duplicate identifier at position {index}")
            }
            Self::AddressRangeOverflow { count } => {
                write!(fmt, "{count} addresses do not fit in the IPv4 space")
            }
        }
    }
}

impl core::error::Error for Error {}

#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
use crate::mutex::{MutexGuard, PoisonError};
#[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
