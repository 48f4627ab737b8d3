use core::{hash::Hash, time::Duration};
use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::{instrument, trace};

use crate::{
    decision::{Decision, NEVER},
    error::{Error, Result},
    state::LeaseState,
};

#[derive(Debug, Clone)]
struct Slot<I> {
    id: I,
    state: LeaseState,
}

/// Leases still outstanding after a reconciliation pass.
#[derive(Debug, Default)]
struct Backlog {
    free: usize,
    /// Leases ending within the current second.
    imminent: usize,
    /// Whole seconds left on every other outstanding lease.
    waits: Vec<u64>,
}

impl Backlog {
    /// Seconds until `needed` more identifiers are free.
    fn come_back_in(mut self, needed: usize) -> u64 {
        if needed <= self.imminent {
            return 0;
        }
        let index = needed - self.imminent - 1;
        if index >= self.waits.len() {
            return NEVER;
        }
        self.waits.sort_unstable();
        self.waits[index]
    }
}

/// The lease state machine behind every pool.
///
/// A [`LeaseTable`] owns the ordered identifier set and one [`LeaseState`]
/// per identifier. All methods take `&mut self` and the caller's notion of
/// `now`; every one of them first returns expired leases to
/// [`LeaseState::Free`], so stale entries never influence a decision.
///
/// The table is not synchronized. Share it through
/// [`LockLeasePool`](crate::LockLeasePool), or wrap it in
/// [`BasicLeasePool`](crate::BasicLeasePool) for single-threaded use.
#[derive(Debug, Clone)]
pub struct LeaseTable<I> {
    slots: Vec<Slot<I>>,
    index: HashMap<I, usize>,
}

impl<I> LeaseTable<I>
where
    I: Clone + Eq + Hash,
{
    /// Creates a table holding `ids`, all initially free.
    ///
    /// Iteration order of `ids` becomes the fixed allocation order.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyPool`] if `ids` yields nothing.
    /// - [`Error::DuplicateIdentifier`] if an identifier repeats.
    pub fn new(ids: impl IntoIterator<Item = I>) -> Result<Self> {
        let ids = ids.into_iter();
        let mut slots = Vec::with_capacity(ids.size_hint().0);
        let mut index = HashMap::with_capacity(ids.size_hint().0);

        for (position, id) in ids.enumerate() {
            if index.insert(id.clone(), position).is_some() {
                return Err(Error::DuplicateIdentifier { index: position });
            }
            slots.push(Slot {
                id,
                state: LeaseState::Free,
            });
        }

        if slots.is_empty() {
            return Err(Error::EmptyPool);
        }

        Ok(Self { slots, index })
    }

    /// Total number of identifiers, leased or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if `id` belongs to this pool.
    pub fn contains(&self, id: &I) -> bool {
        self.index.contains_key(id)
    }

    /// Leases `amount` identifiers for `duration`, or reports how long to
    /// wait.
    ///
    /// 1. Expired leases (`expires_at <= now`) are returned to the pool.
    /// 2. If at least `amount` identifiers are free, the first `amount` of
    ///    them in pool order are leased until `now + duration` and returned in
    ///    [`Decision::Granted`].
    /// 3. Otherwise nothing is leased. With `needed = amount - free`, the
    ///    remaining lease times (whole seconds, rounded down) are sorted
    ///    ascending and the `needed`-th one is returned in
    ///    [`Decision::Deferred`].
    ///
    /// A zero `amount` yields [`Decision::InvalidRequest`]. An `amount` larger
    /// than the pool yields `Deferred` with [`NEVER`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn acquire(&mut self, amount: usize, duration: Duration, now: u64) -> Decision<I> {
        let backlog = self.reconcile(now);

        if amount == 0 {
            return Decision::InvalidRequest {
                reason: String::from("amount must be at least 1"),
            };
        }

        if amount <= backlog.free {
            let expires_at = now.saturating_add(duration_millis(duration));
            let identifiers = self.lease_free(amount, expires_at);
            #[cfg(feature = "tracing")]
            trace!(amount, expires_at, "granted");
            return Decision::Granted { identifiers };
        }

        let needed = amount - backlog.free;
        let come_back_in = backlog.come_back_in(needed);
        #[cfg(feature = "tracing")]
        trace!(amount, needed, come_back_in, "deferred");
        Decision::Deferred { come_back_in }
    }

    /// Number of free identifiers at `now`.
    pub fn free_count(&mut self, now: u64) -> usize {
        self.reconcile(now).free
    }

    /// State of `id` at `now`, or `None` if `id` is not in the pool.
    pub fn state_of(&mut self, id: &I, now: u64) -> Option<LeaseState> {
        self.reconcile(now);
        self.index
            .get(id)
            .map(|&position| self.slots[position].state)
    }

    /// Every identifier with its state at `now`, in pool order.
    pub fn snapshot(&mut self, now: u64) -> Vec<(I, LeaseState)> {
        self.reconcile(now);
        self.slots
            .iter()
            .map(|slot| (slot.id.clone(), slot.state))
            .collect()
    }

    fn reconcile(&mut self, now: u64) -> Backlog {
        let mut backlog = Backlog::default();

        for slot in &mut self.slots {
            if slot.state.is_expired(now) {
                slot.state = LeaseState::Free;
            }
            match slot.state {
                LeaseState::Free => backlog.free += 1,
                state => match state.remaining_secs(now) {
                    0 => backlog.imminent += 1,
                    secs => backlog.waits.push(secs),
                },
            }
        }

        backlog
    }

    fn lease_free(&mut self, amount: usize, expires_at: u64) -> Vec<I> {
        self.slots
            .iter_mut()
            .filter(|slot| slot.state.is_free())
            .take(amount)
            .map(|slot| {
                slot.state = LeaseState::Leased { expires_at };
                slot.id.clone()
            })
            .collect()
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
