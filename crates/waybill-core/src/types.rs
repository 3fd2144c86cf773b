//! # Domain Types
//!
//! Core domain types used throughout Waybill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │ ShippingMethod  │   │  ShippingZone   │   │    ShippingRate     │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │◄──┼─────────────────┼───│  method_id (FK)     │   │
//! │  │  name, carrier  │   │  id             │◄──│  zone_id (FK)       │   │
//! │  │  display_order  │   │  regions        │   │  weight × total     │   │
//! │  └─────────────────┘   └─────────────────┘   │  rate, threshold    │   │
//! │                                              └─────────────────────┘   │
//! │                                                                         │
//! │  Write path: NewShippingRate ──into_rate(id, now)──► ShippingRate      │
//! │  Mutations:  RateChanges { rate?, free_threshold?, is_active? }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Weights are grams, money is minor currency units, both `i64`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::range::{Interval, RateRange};

// =============================================================================
// Shipping Method
// =============================================================================

/// A way of shipping (e.g. "Royal Mail 2nd Class").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShippingMethod {
    pub id: i64,
    pub name: String,
    pub carrier: String,
    pub is_active: bool,
    pub display_order: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a shipping method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShippingMethod {
    pub name: String,
    pub carrier: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub display_order: i64,
}

// =============================================================================
// Shipping Zone
// =============================================================================

/// A destination zone. Region matching happens outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingZone {
    pub id: i64,
    pub name: String,
    /// Countries or regions the zone covers (opaque to the engine).
    pub regions: Vec<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a shipping zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShippingZone {
    pub name: String,
    #[serde(default)]
    pub regions: Vec<String>,
}

// =============================================================================
// Shipping Rate
// =============================================================================

/// One rate rule: a flat charge for a weight × total bracket of a
/// method/zone pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShippingRate {
    pub id: i64,
    pub shipping_method_id: i64,
    pub shipping_zone_id: i64,

    /// Lower weight bound in grams (inclusive).
    pub min_weight: i64,
    /// Upper weight bound in grams (inclusive), `None` = unbounded.
    pub max_weight: Option<i64>,

    /// Lower order total bound in minor units (inclusive).
    pub min_total: i64,
    /// Upper order total bound in minor units (inclusive), `None` = unbounded.
    pub max_total: Option<i64>,

    /// The charge in minor units.
    pub rate: i64,
    /// Order total at or above which shipping is free.
    pub free_threshold: Option<i64>,

    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ShippingRate {
    #[inline]
    pub fn weight_range(&self) -> Interval {
        Interval::new(self.min_weight, self.max_weight)
    }

    #[inline]
    pub fn total_range(&self) -> Interval {
        Interval::new(self.min_total, self.max_total)
    }

    /// The weight × total bracket this rate covers.
    #[inline]
    pub fn range(&self) -> RateRange {
        RateRange::new(self.weight_range(), self.total_range())
    }

    /// Returns the charge as Money.
    #[inline]
    pub fn charge(&self) -> Money {
        Money::from_minor(self.rate)
    }

    /// Whether this rate belongs to the given method/zone pair.
    #[inline]
    pub fn is_for(&self, method_id: i64, zone_id: i64) -> bool {
        self.shipping_method_id == method_id && self.shipping_zone_id == zone_id
    }

    /// Builds a candidate that copies this rate into another zone.
    pub fn copy_into_zone(&self, zone_id: i64) -> NewShippingRate {
        NewShippingRate {
            shipping_method_id: self.shipping_method_id,
            shipping_zone_id: zone_id,
            min_weight: self.min_weight,
            max_weight: self.max_weight,
            min_total: self.min_total,
            max_total: self.max_total,
            rate: self.rate,
            free_threshold: self.free_threshold,
            is_active: self.is_active,
        }
    }
}

/// A rate to be created. Carries no id or timestamps; those are stamped by
/// [`NewShippingRate::into_rate`] on the catalog write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewShippingRate {
    pub shipping_method_id: i64,
    pub shipping_zone_id: i64,
    #[serde(default)]
    pub min_weight: i64,
    #[serde(default)]
    pub max_weight: Option<i64>,
    #[serde(default)]
    pub min_total: i64,
    #[serde(default)]
    pub max_total: Option<i64>,
    pub rate: i64,
    #[serde(default)]
    pub free_threshold: Option<i64>,
    /// New rates are active unless stated otherwise.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl NewShippingRate {
    /// An active candidate for `[min_weight, max_weight] × [min_total, max_total]`.
    pub fn new(method_id: i64, zone_id: i64, range: RateRange, rate: i64) -> Self {
        NewShippingRate {
            shipping_method_id: method_id,
            shipping_zone_id: zone_id,
            min_weight: range.weight.min,
            max_weight: range.weight.max,
            min_total: range.total.min,
            max_total: range.total.max,
            rate,
            free_threshold: None,
            is_active: true,
        }
    }

    pub fn with_free_threshold(mut self, threshold: i64) -> Self {
        self.free_threshold = Some(threshold);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    #[inline]
    pub fn range(&self) -> RateRange {
        RateRange::new(
            Interval::new(self.min_weight, self.max_weight),
            Interval::new(self.min_total, self.max_total),
        )
    }

    /// Stamps the catalog-assigned id and creation time.
    pub fn into_rate(self, id: i64, now: DateTime<Utc>) -> ShippingRate {
        ShippingRate {
            id,
            shipping_method_id: self.shipping_method_id,
            shipping_zone_id: self.shipping_zone_id,
            min_weight: self.min_weight,
            max_weight: self.max_weight,
            min_total: self.min_total,
            max_total: self.max_total,
            rate: self.rate,
            free_threshold: self.free_threshold,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Rate Changes
// =============================================================================

/// A field delta applied by single and bulk updates.
///
/// `free_threshold` distinguishes "leave alone" (`None`) from "clear"
/// (`Some(None)`); in JSON an absent key leaves it alone and `null` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<i64>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub free_threshold: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl RateChanges {
    pub fn rate(mut self, rate: i64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn free_threshold(mut self, threshold: Option<i64>) -> Self {
        self.free_threshold = Some(threshold);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.rate.is_none() && self.free_threshold.is_none() && self.is_active.is_none()
    }

    /// Applies the delta in place, leaving absent fields untouched.
    pub fn apply_to(&self, rate: &mut ShippingRate, now: DateTime<Utc>) {
        if let Some(value) = self.rate {
            rate.rate = value;
        }
        if let Some(threshold) = self.free_threshold {
            rate.free_threshold = threshold;
        }
        if let Some(active) = self.is_active {
            rate.is_active = active;
        }
        rate.updated_at = now;
    }
}

fn default_true() -> bool {
    true
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rate() -> ShippingRate {
        NewShippingRate::new(
            1,
            2,
            RateRange::new(Interval::new(0, Some(5000)), Interval::at_least(0)),
            500,
        )
        .into_rate(10, Utc::now())
    }

    #[test]
    fn test_into_rate_stamps_id_and_timestamps() {
        let now = Utc::now();
        let rate = NewShippingRate::new(
            1,
            2,
            RateRange::new(Interval::new(0, Some(5000)), Interval::new(0, Some(5000))),
            500,
        )
        .into_rate(42, now);

        assert_eq!(rate.id, 42);
        assert!(rate.is_active);
        assert_eq!(rate.created_at, now);
        assert_eq!(rate.updated_at, now);
        assert_eq!(rate.range().weight, Interval::new(0, Some(5000)));
    }

    #[test]
    fn test_new_rate_defaults_active_when_deserialized() {
        let json = r#"{"shipping_method_id":1,"shipping_zone_id":2,"rate":300}"#;
        let candidate: NewShippingRate = serde_json::from_str(json).unwrap();
        assert!(candidate.is_active);
        assert_eq!(candidate.min_weight, 0);
        assert_eq!(candidate.max_total, None);
    }

    #[test]
    fn test_copy_into_zone_keeps_bracket() {
        let rate = sample_rate();
        let copy = rate.copy_into_zone(7);
        assert_eq!(copy.shipping_zone_id, 7);
        assert_eq!(copy.shipping_method_id, rate.shipping_method_id);
        assert_eq!(copy.range(), rate.range());
        assert_eq!(copy.rate, rate.rate);
    }

    #[test]
    fn test_changes_distinguish_absent_from_null() {
        let absent: RateChanges = serde_json::from_str(r#"{"rate":100}"#).unwrap();
        assert_eq!(absent.free_threshold, None);

        let cleared: RateChanges = serde_json::from_str(r#"{"free_threshold":null}"#).unwrap();
        assert_eq!(cleared.free_threshold, Some(None));

        let set: RateChanges = serde_json::from_str(r#"{"free_threshold":2500}"#).unwrap();
        assert_eq!(set.free_threshold, Some(Some(2500)));

        assert!(RateChanges::default().is_empty());
        assert!(!cleared.is_empty());
    }

    #[test]
    fn test_apply_changes_leaves_absent_fields() {
        let mut rate = sample_rate();
        rate.free_threshold = Some(9000);

        RateChanges::default().rate(650).apply_to(&mut rate, Utc::now());
        assert_eq!(rate.rate, 650);
        assert_eq!(rate.free_threshold, Some(9000));
        assert!(rate.is_active);

        RateChanges::default()
            .free_threshold(None)
            .active(false)
            .apply_to(&mut rate, Utc::now());
        assert_eq!(rate.free_threshold, None);
        assert!(!rate.is_active);
        assert_eq!(rate.rate, 650);
    }
}
