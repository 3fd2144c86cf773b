//! Success payloads returned by [`RateEngine`](crate::RateEngine).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use waybill_core::{CandidateRejection, ConflictSource, Money, ShippingCost, ShippingRate};

/// The resolved rate and what it costs for the quoted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub rate: ShippingRate,
    pub cost: Money,
    pub is_free: bool,
    pub free_threshold_met: bool,
}

impl Quote {
    pub fn new(rate: ShippingRate, cost: ShippingCost) -> Self {
        Quote {
            rate,
            cost: cost.cost,
            is_free: cost.is_free,
            free_threshold_met: cost.free_threshold_met,
        }
    }
}

/// Result of an all-or-nothing bulk create.
///
/// ```json
/// { "status": "rejected", "rejected": [{ "index": 3, "reason": { ... } }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum BulkCreateOutcome {
    /// Every candidate was inserted, ids in submission order.
    Created {
        created_count: usize,
        rate_ids: Vec<i64>,
    },
    /// Nothing was inserted; every bad row is listed.
    Rejected { rejected: Vec<CandidateRejection> },
}

impl BulkCreateOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, BulkCreateOutcome::Created { .. })
    }

    pub fn rate_ids(&self) -> &[i64] {
        match self {
            BulkCreateOutcome::Created { rate_ids, .. } => rate_ids,
            BulkCreateOutcome::Rejected { .. } => &[],
        }
    }
}

/// Result of a bulk field update.
///
/// ```json
/// { "updated_count": 2, "skipped": [{ "rate_id": 9, "with": { "kind": "existing_rate", "rate_id": 4 } }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkUpdateOutcome {
    pub updated_count: usize,
    /// Rates left untouched, no field applied, because reactivating them
    /// would overlap an active rate of their pair.
    pub skipped: Vec<SkippedRate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkippedRate {
    pub rate_id: i64,
    pub with: ConflictSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateOutcome {
    pub duplicated_count: usize,
    pub duplicated_rate_ids: Vec<i64>,
}
