//! # Conflict Validator
//!
//! Keeps the catalog free of ambiguous rules: among active rates of one
//! method/zone pair, no two ranges may intersect in both weight and total.
//!
//! ## Batch Screening
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  existing active rates (snapshot)     candidates in submission order    │
//! │                                                                         │
//! │  #0 ──► validate ──► vs existing ──► vs accepted #…  ──► accepted       │
//! │  #1 ──► validate ──► vs existing ──✗ Conflict (existing rate 12)         │
//! │  #2 ──► validate ──► vs existing ──► vs accepted #0 ✗ (Candidate 0)     │
//! │  #3 ──► validate ✗ InvertedRange                                        │
//! │                                                                         │
//! │  Only accepted ACTIVE candidates become peers for later rows, so one    │
//! │  bad row never causes a cascade of secondary rejections.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ConflictSource, RateError, ValidationError};
use crate::range::RateRange;
use crate::types::{NewShippingRate, ShippingRate};
use crate::validation::validate_new_rate;

/// Why one row of a batch was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The row itself is malformed or references something unknown.
    Invalid { error: ValidationError },
    /// The row's range overlaps an active range of the same pair.
    Conflict { with: ConflictSource },
}

impl From<ValidationError> for RejectionReason {
    fn from(error: ValidationError) -> Self {
        RejectionReason::Invalid { error }
    }
}

/// A rejected batch row: its position and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CandidateRejection {
    pub index: usize,
    pub reason: RejectionReason,
}

impl RejectionReason {
    /// Converts into a [`RateError`]; `index` is `None` outside a batch.
    pub fn into_error(self, index: Option<usize>) -> RateError {
        match self {
            RejectionReason::Invalid { error } => RateError::Validation(error),
            RejectionReason::Conflict { with } => RateError::Conflict { index, with },
        }
    }
}

impl CandidateRejection {
    pub fn into_error(self) -> RateError {
        self.reason.into_error(Some(self.index))
    }
}

#[derive(Debug, Clone, Copy)]
struct AcceptedCandidate {
    index: usize,
    method_id: i64,
    zone_id: i64,
    range: RateRange,
}

/// Checks candidate ranges against a snapshot of the catalog and against
/// each other.
///
/// `existing` may hold rates of several pairs; inactive rows are ignored.
#[derive(Debug)]
pub struct ConflictValidator<'a> {
    existing: &'a [ShippingRate],
    accepted: Vec<AcceptedCandidate>,
}

impl<'a> ConflictValidator<'a> {
    pub fn new(existing: &'a [ShippingRate]) -> Self {
        ConflictValidator {
            existing,
            accepted: Vec::new(),
        }
    }

    /// The lowest-id active rate of the pair overlapping `range`, skipping
    /// `exclude` (the rate being re-checked itself).
    pub fn conflicting_rate(
        &self,
        method_id: i64,
        zone_id: i64,
        range: &RateRange,
        exclude: Option<i64>,
    ) -> Option<&'a ShippingRate> {
        self.existing
            .iter()
            .filter(|rate| rate.is_active && rate.is_for(method_id, zone_id))
            .filter(|rate| Some(rate.id) != exclude)
            .filter(|rate| rate.range().conflicts_with(range))
            .min_by_key(|rate| rate.id)
    }

    /// Whether `range` overlaps an active catalog rate of the pair.
    pub fn has_conflict(&self, method_id: i64, zone_id: i64, range: &RateRange) -> bool {
        self.conflicting_rate(method_id, zone_id, range, None).is_some()
    }

    /// Screens one candidate and, if accepted, remembers it as a peer for
    /// later candidates of the same batch.
    ///
    /// Inactive candidates are validated but never conflict and never
    /// become peers.
    pub fn admit(
        &mut self,
        index: usize,
        candidate: &NewShippingRate,
    ) -> Result<(), RejectionReason> {
        validate_new_rate(candidate)?;

        if !candidate.is_active {
            return Ok(());
        }

        let method_id = candidate.shipping_method_id;
        let zone_id = candidate.shipping_zone_id;
        let range = candidate.range();

        if let Some(rate) = self.conflicting_rate(method_id, zone_id, &range, None) {
            return Err(RejectionReason::Conflict {
                with: ConflictSource::ExistingRate { rate_id: rate.id },
            });
        }

        if let Some(peer) = self.accepted.iter().find(|peer| {
            peer.method_id == method_id
                && peer.zone_id == zone_id
                && peer.range.conflicts_with(&range)
        }) {
            return Err(RejectionReason::Conflict {
                with: ConflictSource::Candidate { index: peer.index },
            });
        }

        self.accepted.push(AcceptedCandidate {
            index,
            method_id,
            zone_id,
            range,
        });
        Ok(())
    }

    /// Records a rejection for `index` unless it is admitted.
    pub fn screen(
        &mut self,
        index: usize,
        candidate: &NewShippingRate,
    ) -> Option<CandidateRejection> {
        self.admit(index, candidate)
            .err()
            .map(|reason| CandidateRejection { index, reason })
    }
}

/// Screens a whole batch against `existing`, returning every rejected row
/// in index order. An empty result means the batch may be inserted as is.
pub fn find_conflicts(
    existing: &[ShippingRate],
    candidates: &[NewShippingRate],
) -> Vec<CandidateRejection> {
    let mut validator = ConflictValidator::new(existing);
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| validator.screen(index, candidate))
        .collect()
}
