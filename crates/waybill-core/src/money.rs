//! # Money Module
//!
//! Integer money in minor currency units (pence, cents).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The engine never sees a decimal amount.                                │
//! │                                                                         │
//! │  Admin UI: "£4.99"  ──► caller converts ──► 499 ──► engine stores 499   │
//! │                                                                         │
//! │  Rates, thresholds, bracket bounds and order totals are all i64 minor   │
//! │  units, so comparisons against a free threshold are exact.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Formatting for display is the caller's concern; this type has no
//! currency and no `Display`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A monetary value in the smallest currency unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use waybill_core::money::Money;
    ///
    /// let rate = Money::from_minor(499);
    /// assert_eq!(rate.minor(), 499);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero money (free shipping).
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
