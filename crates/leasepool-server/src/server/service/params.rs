use crate::server::error::{Error, Result};
use core::time::Duration;
use serde::Deserialize;

/// Raw query parameters of `GET /get_slaves`.
///
/// Both fields are kept as strings so that missing or non-numeric values end
/// up as [`Error::InvalidRequest`] rather than a framework rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LeaseParams {
    pub amount: Option<String>,
    pub duration: Option<String>,
}

/// A validated lease request, ready for the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseRequest {
    pub amount: usize,
    pub duration: Duration,
}

impl LeaseParams {
    /// Checks the raw parameters against the pool.
    ///
    /// `amount` must be an integer in `1..=capacity`; `duration` a
    /// non-negative number of seconds no larger than `max_lease_secs`.
    pub fn validate(&self, capacity: usize, max_lease_secs: Option<u64>) -> Result<LeaseRequest> {
        let amount = parse_field("amount", self.amount.as_deref())?;
        let duration = parse_field("duration", self.duration.as_deref())?;

        if amount == 0 {
            return Err(Error::invalid("amount must be at least 1"));
        }
        let amount = usize::try_from(amount)
            .ok()
            .filter(|&amount| amount <= capacity)
            .ok_or_else(|| {
                Error::invalid(format!("amount {amount} exceeds pool capacity {capacity}"))
            })?;

        if let Some(max) = max_lease_secs.filter(|&max| duration > max) {
            return Err(Error::invalid(format!("duration {duration}s exceeds the {max}s limit")));
        }

        Ok(LeaseRequest {
            amount,
            duration: Duration::from_secs(duration),
        })
    }
}

fn parse_field(name: &str, raw: Option<&str>) -> Result<u64> {
    let raw = raw.ok_or_else(|| Error::invalid(format!("missing `{name}`")))?;
    raw.trim().parse().map_err(|e| {
        let reason = format!("`{name}`={raw:?} is not a non-negative integer: {e}");
        Error::invalid(reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(amount: &str, duration: &str) -> LeaseParams {
        LeaseParams {
            amount: Some(amount.to_owned()),
            duration: Some(duration.to_owned()),
        }
    }

    #[test]
    fn accepts_numbers_within_bounds() {
        assert_eq!(
            params("3", " 60 ").validate(10, None),
            Ok(LeaseRequest {
                amount: 3,
                duration: Duration::from_secs(60),
            })
        );
        assert_eq!(params("10", "0").validate(10, Some(0)).unwrap().amount, 10);
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(LeaseParams::default().validate(10, None).is_err());
        let only_amount = LeaseParams {
            amount: Some("1".into()),
            duration: None,
        };
        assert!(only_amount.validate(10, None).is_err());
    }

    #[test]
    fn rejects_non_numeric_and_negative() {
        for (amount, duration) in [
            ("abc", "10"),
            ("1", "ten"),
            ("-1", "10"),
            ("1", "-5"),
            ("1.5", "10"),
        ] {
            assert!(
                matches!(
                    params(amount, duration).validate(10, None),
                    Err(Error::InvalidRequest { .. })
                ),
                "{amount}/{duration}"
            );
        }
    }

    #[test]
    fn rejects_zero_and_over_capacity() {
        assert!(params("0", "10").validate(10, None).is_err());
        assert!(params("11", "10").validate(10, None).is_err());
        let huge = params("18446744073709551615", "10");
        assert!(huge.validate(10, None).is_err());
    }

    #[test]
    fn enforces_lease_limit() {
        assert!(params("1", "601").validate(10, Some(600)).is_err());
        assert!(params("1", "600").validate(10, Some(600)).is_ok());
    }
}
