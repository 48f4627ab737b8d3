use crate::error::{Error, Result};
use std::net::Ipv4Addr;

/// Builds `count` consecutive IPv4 addresses starting at `start`.
///
/// This is the usual way to seed an address pool:
///
/// ```
/// use std::net::Ipv4Addr;
/// use leasepool::ipv4_range;
///
/// let addrs = ipv4_range(Ipv4Addr::new(192, 168, 0, 101), 10).unwrap();
/// assert_eq!(addrs.first(), Some(&Ipv4Addr::new(192, 168, 0, 101)));
/// assert_eq!(addrs.last(), Some(&Ipv4Addr::new(192, 168, 0, 110)));
/// ```
///
/// # Errors
///
/// Returns [`Error::AddressRangeOverflow`] if the range would run past
/// `255.255.255.255`.
pub fn ipv4_range(start: Ipv4Addr, count: usize) -> Result<Vec<Ipv4Addr>> {
    let first = u32::from(start);
    let overflow = || Error::AddressRangeOverflow { count };

    if count > 0 {
        let span = u32::try_from(count - 1).map_err(|_| overflow())?;
        first.checked_add(span).ok_or_else(overflow)?;
    }

    Ok((0..count)
        .map(|i| Ipv4Addr::from(first + i as u32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_crosses_octet_boundary() {
        let addrs = ipv4_range(Ipv4Addr::new(10, 0, 0, 254), 3).unwrap();
        assert_eq!(
            addrs,
            [
                Ipv4Addr::new(10, 0, 0, 254),
                Ipv4Addr::new(10, 0, 0, 255),
                Ipv4Addr::new(10, 0, 1, 0),
            ]
        );
    }

    #[test]
    fn empty_range() {
        assert!(ipv4_range(Ipv4Addr::BROADCAST, 0).unwrap().is_empty());
    }

    #[test]
    fn range_up_to_broadcast_fits() {
        let addrs = ipv4_range(Ipv4Addr::new(255, 255, 255, 254), 2).unwrap();
        assert_eq!(addrs.last(), Some(&Ipv4Addr::BROADCAST));
    }

    #[test]
    fn range_past_broadcast_overflows() {
        assert_eq!(
            ipv4_range(Ipv4Addr::new(255, 255, 255, 254), 3),
            Err(Error::AddressRangeOverflow { count: 3 })
        );
    }
}
