//! # Rate Resolver
//!
//! Selects the single rate that applies to a concrete
//! (method, zone, weight, total) query.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve(rates, method=1, zone=2, weight=2000g, total=3000)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  keep rates where is_active && method == 1 && zone == 2                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  keep rates whose weight range ∋ 2000 and total range ∋ 3000           │
//! │       │                                                                 │
//! │       ├── none   → RateError::NoMatchingRate                            │
//! │       ├── one    → that rate                                            │
//! │       └── several (imported data broke the no-overlap invariant)        │
//! │             → narrowest total span                                      │
//! │             → then narrowest weight span                                │
//! │             → then lowest id                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;

use crate::error::{RateError, RateResult};
use crate::types::ShippingRate;
use crate::validation::validate_query;

/// Resolves the applicable rate among `rates`.
///
/// `rates` may contain anything (other pairs, inactive rows); only active
/// rates of the given pair are considered.
pub fn resolve(
    rates: &[ShippingRate],
    method_id: i64,
    zone_id: i64,
    weight: i64,
    total: i64,
) -> RateResult<&ShippingRate> {
    validate_query(weight, total)?;

    matching_rates(rates, method_id, zone_id, weight, total)
        .into_iter()
        .min_by(|a, b| precedence(a, b))
        .ok_or(RateError::NoMatchingRate {
            method_id,
            zone_id,
            weight,
            total,
        })
}

/// Every active rate of the pair whose bracket contains the point.
pub fn matching_rates(
    rates: &[ShippingRate],
    method_id: i64,
    zone_id: i64,
    weight: i64,
    total: i64,
) -> Vec<&ShippingRate> {
    rates
        .iter()
        .filter(|rate| rate.is_active && rate.is_for(method_id, zone_id))
        .filter(|rate| rate.range().contains(weight, total))
        .collect()
}

/// Orders two matching rates; the smaller one wins.
fn precedence(a: &ShippingRate, b: &ShippingRate) -> Ordering {
    a.total_range()
        .narrowness()
        .cmp(&b.total_range().narrowness())
        .then_with(|| a.weight_range().narrowness().cmp(&b.weight_range().narrowness()))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{Interval, RateRange};
    use crate::types::NewShippingRate;
    use chrono::Utc;

    fn rate(id: i64, weight: Interval, total: Interval, charge: i64) -> ShippingRate {
        NewShippingRate::new(1, 2, RateRange::new(weight, total), charge).into_rate(id, Utc::now())
    }

    fn bounded(min: i64, max: i64) -> Interval {
        Interval::new(min, Some(max))
    }

    #[test]
    fn test_resolves_single_match() {
        let rates = vec![
            rate(1, bounded(0, 5000), bounded(0, 5000), 500),
            rate(2, bounded(5001, 10000), bounded(0, 5000), 900),
        ];

        assert_eq!(resolve(&rates, 1, 2, 2000, 3000).unwrap().id, 1);
        assert_eq!(resolve(&rates, 1, 2, 5000, 5000).unwrap().id, 1);
        assert_eq!(resolve(&rates, 1, 2, 5001, 0).unwrap().id, 2);
    }

    #[test]
    fn test_no_match_reports_query() {
        let rates = vec![rate(1, bounded(0, 5000), bounded(0, 5000), 500)];

        assert_eq!(
            resolve(&rates, 1, 2, 6000, 100),
            Err(RateError::NoMatchingRate {
                method_id: 1,
                zone_id: 2,
                weight: 6000,
                total: 100,
            })
        );
        // other pair
        assert!(resolve(&rates, 1, 3, 100, 100).is_err());
    }

    #[test]
    fn test_inactive_rates_are_ignored() {
        let mut inactive = rate(1, bounded(0, 5000), bounded(0, 5000), 500);
        inactive.is_active = false;
        let rates = vec![inactive, rate(2, Interval::at_least(0), Interval::at_least(0), 800)];

        assert_eq!(resolve(&rates, 1, 2, 100, 100).unwrap().id, 2);
    }

    #[test]
    fn test_overlap_prefers_narrowest_total_then_weight_then_id() {
        let rates = vec![
            rate(5, bounded(0, 1000), Interval::at_least(0), 100),
            rate(4, bounded(0, 9000), bounded(0, 2000), 200),
            rate(3, bounded(0, 1000), bounded(0, 2000), 300),
            rate(2, bounded(0, 1000), bounded(0, 2000), 400),
            rate(6, bounded(0, 9000), Interval::at_least(0), 500),
        ];

        // 2, 3 tie on both spans; lowest id wins over 4 (wider weight) and 5, 6 (unbounded total).
        assert_eq!(resolve(&rates, 1, 2, 500, 500).unwrap().id, 2);

        // Reordering the input does not change the answer.
        let mut reversed = rates.clone();
        reversed.reverse();
        assert_eq!(resolve(&reversed, 1, 2, 500, 500).unwrap().id, 2);

        // Past 1000g only 4 and 6 match: bounded total beats unbounded.
        assert_eq!(resolve(&rates, 1, 2, 5000, 500).unwrap().id, 4);
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let rates = vec![rate(1, Interval::at_least(0), Interval::at_least(0), 500)];
        assert!(matches!(
            resolve(&rates, 1, 2, -1, 0),
            Err(RateError::Validation(_))
        ));
    }

    #[test]
    fn test_midpoint_of_each_disjoint_rate_resolves_to_itself() {
        let rates = vec![
            rate(1, bounded(0, 999), bounded(0, 4999), 300),
            rate(2, bounded(1000, 4999), bounded(0, 4999), 450),
            rate(3, bounded(0, 4999), bounded(5000, 19999), 150),
            rate(4, bounded(5000, 30000), bounded(0, 19999), 1200),
        ];

        for expected in &rates {
            let weight = (expected.min_weight + expected.max_weight.unwrap()) / 2;
            let total = (expected.min_total + expected.max_total.unwrap()) / 2;
            assert_eq!(resolve(&rates, 1, 2, weight, total).unwrap().id, expected.id);
        }
    }
}
