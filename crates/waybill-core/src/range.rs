//! # Rate Ranges
//!
//! Closed intervals over weight (grams) and order total (minor units).
//!
//! ## Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two rate ranges CONFLICT iff BOTH dimensions intersect.                │
//! │                                                                         │
//! │  total ▲                                                                │
//! │   5000 ┤ ┌───────A───────┐┌──────C──────┐   A: w[0,5000]     t[0,5000] │
//! │        │ │          ┌────┼┼──┐          │   B: w[2000,8000]  t[0,5000] │
//! │        │ │          │ B  ││  │          │   C: w[5001,10000] t[0,5000] │
//! │      0 ┼─┴──────────┴────┘└──┴──────────┴─► weight                      │
//! │                                                                         │
//! │  A × B: weights meet in [2000,5000], totals meet → CONFLICT            │
//! │  A × C: weights disjoint (5000 < 5001)           → no conflict         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bounds are inclusive on both ends. A missing upper bound means +∞.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A closed interval `[min, max]`; `max = None` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Interval {
    pub min: i64,
    pub max: Option<i64>,
}

impl Interval {
    #[inline]
    pub const fn new(min: i64, max: Option<i64>) -> Self {
        Interval { min, max }
    }

    /// `[min, +∞)`
    #[inline]
    pub const fn at_least(min: i64) -> Self {
        Interval { min, max: None }
    }

    /// Whether `value` lies within the interval (inclusive).
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }

    /// Whether two intervals share at least one point.
    ///
    /// `[a, b]` and `[c, d]` intersect iff `a <= d` and `c <= b`.
    pub fn intersects(&self, other: &Interval) -> bool {
        let starts_before_other_ends = other.max.map_or(true, |max| self.min <= max);
        let other_starts_before_end = self.max.map_or(true, |max| other.min <= max);
        starts_before_other_ends && other_starts_before_end
    }

    /// Width of the interval, `None` when unbounded.
    #[inline]
    pub fn span(&self) -> Option<i64> {
        self.max.map(|max| max.saturating_sub(self.min))
    }

    /// Sort key ordering narrow intervals first and unbounded ones last.
    #[inline]
    pub(crate) fn narrowness(&self) -> (bool, i64) {
        match self.span() {
            Some(span) => (false, span),
            None => (true, 0),
        }
    }

    /// `max >= min` when an upper bound is present.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.max.map_or(true, |max| max >= self.min)
    }
}

/// The weight interval × total interval a single rate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateRange {
    /// Package weight in grams.
    pub weight: Interval,
    /// Order total in minor currency units.
    pub total: Interval,
}

impl RateRange {
    #[inline]
    pub const fn new(weight: Interval, total: Interval) -> Self {
        RateRange { weight, total }
    }

    /// Whether a concrete (weight, total) point falls inside this range.
    #[inline]
    pub fn contains(&self, weight: i64, total: i64) -> bool {
        self.weight.contains(weight) && self.total.contains(total)
    }

    /// Two ranges conflict iff they intersect in both dimensions.
    #[inline]
    pub fn conflicts_with(&self, other: &RateRange) -> bool {
        self.weight.intersects(&other.weight) && self.total.intersects(&other.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(min: i64, max: i64) -> Interval {
        Interval::new(min, Some(max))
    }

    #[test]
    fn test_contains_is_inclusive() {
        let i = bounded(100, 200);
        assert!(i.contains(100));
        assert!(i.contains(200));
        assert!(!i.contains(99));
        assert!(!i.contains(201));

        let open = Interval::at_least(100);
        assert!(open.contains(i64::MAX));
        assert!(!open.contains(0));
    }

    #[test]
    fn test_intersects() {
        assert!(bounded(0, 5000).intersects(&bounded(2000, 8000)));
        assert!(bounded(0, 5000).intersects(&bounded(5000, 6000)));
        assert!(!bounded(0, 5000).intersects(&bounded(5001, 10000)));
        assert!(!bounded(5001, 10000).intersects(&bounded(0, 5000)));

        assert!(Interval::at_least(0).intersects(&bounded(9000, 9001)));
        assert!(Interval::at_least(100).intersects(&Interval::at_least(5)));
        assert!(!Interval::at_least(6000).intersects(&bounded(0, 5999)));
    }

    #[test]
    fn test_conflict_needs_both_dimensions() {
        let a = RateRange::new(bounded(0, 5000), bounded(0, 5000));
        let weight_only = RateRange::new(bounded(2000, 8000), bounded(6000, 9000));
        let total_only = RateRange::new(bounded(6000, 9000), bounded(0, 5000));
        let both = RateRange::new(bounded(2000, 8000), bounded(0, 5000));

        assert!(!a.conflicts_with(&weight_only));
        assert!(!a.conflicts_with(&total_only));
        assert!(a.conflicts_with(&both));
        assert!(both.conflicts_with(&a));
    }

    #[test]
    fn test_narrowness_orders_unbounded_last() {
        assert!(bounded(0, 10).narrowness() < bounded(0, 20).narrowness());
        assert!(bounded(0, i64::MAX).narrowness() < Interval::at_least(0).narrowness());
    }

    #[test]
    fn test_is_ordered() {
        assert!(bounded(5, 5).is_ordered());
        assert!(Interval::at_least(5).is_ordered());
        assert!(!bounded(6, 5).is_ordered());
    }
}
