use std::time::{SystemTime, UNIX_EPOCH};

/// A trait for time sources that return a monotonic or wall-clock timestamp.
///
/// Pools never read a clock on their own; callers either pass `now`
/// explicitly or hand a [`TimeSource`] to
/// [`LeaseAllocator::try_acquire_now`]. This keeps the allocation logic
/// deterministic and lets tests drive time by hand.
///
/// The unit is **milliseconds** relative to an origin chosen by the
/// implementation. All timestamps given to one pool must share that origin.
///
/// # Example
///
/// ```
/// use leasepool::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
///
/// [`LeaseAllocator::try_acquire_now`]: crate::LeaseAllocator::try_acquire_now
pub trait TimeSource {
    /// Returns the current time in milliseconds since the source's origin.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Wall-clock time source counting milliseconds since the UNIX epoch.
///
/// A system clock set before 1970 reads as `0`, which only makes leases look
/// longer than requested; it never frees an identifier early.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}
