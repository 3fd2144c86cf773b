//! # Cost Calculator
//!
//! Turns a resolved rate and an order total into a shipping charge.
//!
//! ```text
//! cost
//!  ▲
//!  │ rate ●━━━━━━━━━━━━━━━━━━━━━━━○
//!  │                              │
//!  │    0                         ●━━━━━━━━━━━━━━━━━━━━
//!  └──────────────────────────────┼────────────────────► order total
//!                           free_threshold
//! ```
//!
//! Pricing is flat per bracket: no proration by weight.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::ShippingRate;

/// The charge for one resolved rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingCost {
    /// Amount to charge, never negative.
    pub cost: Money,
    /// The charge is zero, for whatever reason.
    pub is_free: bool,
    /// The order total reached the rate's free threshold.
    pub free_threshold_met: bool,
}

/// Computes the shipping charge for `total` under `rate`.
///
/// ```rust
/// # use chrono::Utc;
/// use waybill_core::{pricing, Interval, NewShippingRate, RateRange};
///
/// let range = RateRange::new(Interval::at_least(0), Interval::at_least(0));
/// let rate = NewShippingRate::new(1, 2, range, 500)
///     .with_free_threshold(5000)
///     .into_rate(1, Utc::now());
///
/// assert_eq!(pricing::cost(&rate, 4999).cost.minor(), 500);
/// assert_eq!(pricing::cost(&rate, 5000).cost.minor(), 0);
/// ```
pub fn cost(rate: &ShippingRate, total: i64) -> ShippingCost {
    let free_threshold_met = rate
        .free_threshold
        .map_or(false, |threshold| total >= threshold);

    let cost = if free_threshold_met {
        Money::zero()
    } else {
        rate.charge()
    };

    ShippingCost {
        cost,
        is_free: cost.is_zero(),
        free_threshold_met,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{Interval, RateRange};
    use crate::types::NewShippingRate;
    use chrono::Utc;

    fn rate(charge: i64, threshold: Option<i64>) -> ShippingRate {
        let mut candidate = NewShippingRate::new(
            1,
            2,
            RateRange::new(Interval::at_least(0), Interval::at_least(0)),
            charge,
        );
        candidate.free_threshold = threshold;
        candidate.into_rate(1, Utc::now())
    }

    #[test]
    fn test_flat_rate_without_threshold() {
        let r = rate(500, None);
        for total in [0, 1, 4999, 5000, 1_000_000] {
            let charge = cost(&r, total);
            assert_eq!(charge.cost, Money::from_minor(500));
            assert!(!charge.is_free);
            assert!(!charge.free_threshold_met);
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let r = rate(500, Some(5000));

        for total in [0, 2500, 4999] {
            assert_eq!(cost(&r, total).cost.minor(), 500);
        }
        for total in [5000, 5001, 90_000] {
            let charge = cost(&r, total);
            assert_eq!(charge.cost, Money::zero());
            assert!(charge.is_free);
            assert!(charge.free_threshold_met);
        }
    }

    #[test]
    fn test_cost_is_monotonic_non_increasing_in_total() {
        let r = rate(725, Some(3000));
        let charges: Vec<i64> = (0..6000).step_by(250).map(|t| cost(&r, t).cost.minor()).collect();
        assert!(charges.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(charges.iter().filter(|&&c| c != 0 && c != 725).count(), 0);
    }

    #[test]
    fn test_zero_rate_is_free_without_threshold() {
        let charge = cost(&rate(0, None), 100);
        assert!(charge.is_free);
        assert!(!charge.free_threshold_met);
    }

    #[test]
    fn test_zero_threshold_always_free() {
        let charge = cost(&rate(500, Some(0)), 0);
        assert!(charge.free_threshold_met);
        assert_eq!(charge.cost.minor(), 0);
    }
}
