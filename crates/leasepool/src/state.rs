/// Milliseconds in one second, the granularity of reported waits.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// The lease state of a single identifier.
///
/// A leased identifier turns free the moment the observed time reaches
/// `expires_at`. Nothing flips the state on a timer; the pool reconciles
/// expired leases on every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LeaseState {
    /// Available for immediate allocation.
    #[default]
    Free,
    /// Held until `expires_at` (milliseconds, exclusive).
    Leased {
        /// Instant at which the lease lapses.
        expires_at: u64,
    },
}

impl LeaseState {
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    pub const fn expires_at(&self) -> Option<u64> {
        match self {
            Self::Free => None,
            Self::Leased { expires_at } => Some(*expires_at),
        }
    }

    /// Returns `true` if this lease has lapsed at `now`.
    pub const fn is_expired(&self, now: u64) -> bool {
        match self {
            Self::Free => false,
            Self::Leased { expires_at } => *expires_at <= now,
        }
    }

    /// Whole seconds left on the lease at `now`, rounded down.
    ///
    /// Free and expired entries have no remaining time.
    pub const fn remaining_secs(&self, now: u64) -> u64 {
        match self {
            Self::Leased { expires_at } if *expires_at > now => {
                (*expires_at - now) / MILLIS_PER_SEC
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_expires_exactly_at_deadline() {
        let state = LeaseState::Leased { expires_at: 10_000 };
        assert!(!state.is_expired(9_999));
        assert!(state.is_expired(10_000));
        assert!(state.is_expired(10_001));
        assert!(!LeaseState::Free.is_expired(u64::MAX));
    }

    #[test]
    fn remaining_secs_rounds_down() {
        let state = LeaseState::Leased { expires_at: 10_000 };
        assert_eq!(state.remaining_secs(0), 10);
        assert_eq!(state.remaining_secs(1), 9);
        assert_eq!(state.remaining_secs(9_001), 0);
        assert_eq!(state.remaining_secs(10_000), 0);
        assert_eq!(state.remaining_secs(20_000), 0);
        assert_eq!(LeaseState::Free.remaining_secs(0), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_tagged_variant() {
        let json = serde_json::to_string(&LeaseState::Leased { expires_at: 5 }).unwrap();
        assert_eq!(json, r#"{"leased":{"expires_at":5}}"#);
        let json = serde_json::to_string(&LeaseState::Free).unwrap();
        assert_eq!(json, r#""free""#);
    }
}
