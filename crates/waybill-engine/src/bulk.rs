//! # Bulk Mutation Coordinator
//!
//! Multi-row writes, each inside one [`WriteScope`](crate::gate::WriteScope).
//!
//! ## Workflows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  bulk_create(candidates)           ALL OR NOTHING                       │
//! │  ├── size check (1..=max_batch_size)                                    │
//! │  ├── load active rates for every (method, zone) in the batch            │
//! │  ├── screen each row: valid? references exist? overlaps?                │
//! │  ├── any rejection → rollback, Rejected { every bad row }               │
//! │  └── else insert all in order → Created { ids }                         │
//! │                                                                         │
//! │  bulk_update(ids, changes)         BEST EFFORT, COUNTED                 │
//! │  ├── empty delta → NoChanges                                            │
//! │  ├── size check on distinct ids                                         │
//! │  ├── unknown ids → not counted                                          │
//! │  └── reactivation that would overlap → skipped, listed with its rival   │
//! │                                                                         │
//! │  duplicate(source, zones)          BEST EFFORT, COUNTED                 │
//! │  ├── source zone → skipped                                              │
//! │  ├── zone where the copy would overlap → skipped                        │
//! │  └── count = distinct zones − source − conflicts                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

use waybill_core::validation::{validate_batch_size, validate_changes, validate_new_rate};
use waybill_core::{
    CandidateRejection, ConflictSource, ConflictValidator, NewShippingRate, RateChanges, RateError,
    RejectionReason, ShippingRate, ValidationError,
};
use waybill_db::{CatalogTransaction, Database, DbResult};

use crate::error::EngineResult;
use crate::gate::WriteGate;
use crate::outcome::{BulkCreateOutcome, BulkUpdateOutcome, DuplicateOutcome, SkippedRate};

/// Runs the bulk workflows against one database under one write gate.
#[derive(Debug, Clone, Copy)]
pub struct BulkMutationCoordinator<'a> {
    db: &'a Database,
    gate: &'a WriteGate,
    max_batch_size: usize,
}

impl<'a> BulkMutationCoordinator<'a> {
    pub fn new(db: &'a Database, gate: &'a WriteGate, max_batch_size: usize) -> Self {
        BulkMutationCoordinator {
            db,
            gate,
            max_batch_size,
        }
    }

    // =========================================================================
    // Bulk Create
    // =========================================================================

    /// Inserts every candidate, or none of them.
    ///
    /// Rejections are an `Ok` outcome listing each bad row with its index;
    /// `Err` is reserved for an unusable request (size limits) or storage
    /// faults.
    pub async fn bulk_create(
        &self,
        candidates: &[NewShippingRate],
    ) -> EngineResult<BulkCreateOutcome> {
        validate_batch_size("rates", candidates.len(), self.max_batch_size)?;
        info!(count = candidates.len(), "Bulk creating shipping rates");

        let mut scope = self.gate.open(self.db).await?;

        let references = KnownReferences::load(&mut scope.tx, candidates).await?;

        let pairs: BTreeSet<(i64, i64)> = candidates
            .iter()
            .map(|c| (c.shipping_method_id, c.shipping_zone_id))
            .collect();
        let mut existing = Vec::new();
        for (method_id, zone_id) in pairs {
            existing.extend(scope.tx.find_active_for(method_id, zone_id).await?);
        }

        let mut validator = ConflictValidator::new(&existing);
        let mut rejected = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let screened = validate_new_rate(candidate)
                .and_then(|_| references.check(candidate))
                .map_err(RejectionReason::from)
                .and_then(|_| validator.admit(index, candidate));

            if let Err(reason) = screened {
                rejected.push(CandidateRejection { index, reason });
            }
        }

        if !rejected.is_empty() {
            scope.rollback().await?;
            warn!(
                count = candidates.len(),
                rejected = rejected.len(),
                "Bulk create rejected, nothing inserted"
            );
            return Ok(BulkCreateOutcome::Rejected { rejected });
        }

        let mut rate_ids = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            rate_ids.push(scope.tx.insert_rate(candidate).await?.id);
        }
        scope.commit().await?;

        info!(created = rate_ids.len(), "Bulk create committed");
        Ok(BulkCreateOutcome::Created {
            created_count: rate_ids.len(),
            rate_ids,
        })
    }

    // =========================================================================
    // Bulk Update
    // =========================================================================

    /// Applies one delta to every listed rate that exists.
    ///
    /// A rate whose reactivation would overlap an active rate of its pair
    /// is left untouched and reported in `skipped`.
    pub async fn bulk_update(
        &self,
        rate_ids: &[i64],
        changes: RateChanges,
    ) -> EngineResult<BulkUpdateOutcome> {
        if changes.is_empty() {
            return Err(RateError::NoChanges.into());
        }
        validate_changes(&changes)?;

        let mut ids = rate_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        validate_batch_size("rate_ids", ids.len(), self.max_batch_size)?;

        let mut scope = self.gate.open(self.db).await?;
        let rates = scope.tx.get_rates(&ids).await?;
        let now = Utc::now();

        // Active rates per pair, loaded when a pair first sees a reactivation
        let mut active_by_pair: HashMap<(i64, i64), Vec<ShippingRate>> = HashMap::new();
        let mut updated_count = 0;
        let mut skipped = Vec::new();

        for mut rate in rates {
            let was_active = rate.is_active;
            changes.apply_to(&mut rate, now);

            if rate.is_active && !was_active {
                let (method_id, zone_id) = (rate.shipping_method_id, rate.shipping_zone_id);
                let active = match active_by_pair.entry((method_id, zone_id)) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        entry.insert(scope.tx.find_active_for(method_id, zone_id).await?)
                    }
                };

                let conflicting = ConflictValidator::new(active)
                    .conflicting_rate(method_id, zone_id, &rate.range(), Some(rate.id))
                    .map(|other| other.id);
                if let Some(conflicting_rate_id) = conflicting {
                    debug!(
                        rate_id = rate.id,
                        conflicting_rate_id, "Skipping reactivation that would overlap"
                    );
                    skipped.push(SkippedRate {
                        rate_id: rate.id,
                        with: ConflictSource::ExistingRate {
                            rate_id: conflicting_rate_id,
                        },
                    });
                    continue;
                }
                active.push(rate.clone());
            }

            if scope.tx.update_rate(&rate).await? {
                updated_count += 1;
            }
        }

        scope.commit().await?;

        info!(
            requested = rate_ids.len(),
            updated = updated_count,
            skipped = skipped.len(),
            "Bulk update committed"
        );
        Ok(BulkUpdateOutcome {
            updated_count,
            skipped,
        })
    }

    // =========================================================================
    // Duplicate
    // =========================================================================

    /// Copies one rate into each target zone where it fits.
    pub async fn duplicate(
        &self,
        source_rate_id: i64,
        target_zone_ids: &[i64],
    ) -> EngineResult<DuplicateOutcome> {
        let mut scope = self.gate.open(self.db).await?;

        let source = scope
            .tx
            .get_rate(source_rate_id)
            .await?
            .ok_or(RateError::RateNotFound(source_rate_id))?;

        let mut targets: Vec<i64> = Vec::with_capacity(target_zone_ids.len());
        for zone_id in target_zone_ids {
            if *zone_id != source.shipping_zone_id && !targets.contains(zone_id) {
                targets.push(*zone_id);
            }
        }

        let known: HashSet<i64> = scope.tx.existing_zone_ids(&targets).await?.into_iter().collect();
        if let Some(unknown) = targets.iter().find(|zone_id| !known.contains(*zone_id)) {
            return Err(ValidationError::unknown("Shipping zone", *unknown).into());
        }

        let existing = scope
            .tx
            .find_active_for_zones(source.shipping_method_id, &targets)
            .await?;
        let mut validator = ConflictValidator::new(&existing);
        let mut duplicated_rate_ids = Vec::with_capacity(targets.len());

        for (index, zone_id) in targets.iter().enumerate() {
            let candidate = source.copy_into_zone(*zone_id);
            if let Err(reason) = validator.admit(index, &candidate) {
                debug!(source_rate_id, zone_id, ?reason, "Skipping zone");
                continue;
            }
            duplicated_rate_ids.push(scope.tx.insert_rate(&candidate).await?.id);
        }

        scope.commit().await?;

        info!(
            source_rate_id,
            zones = target_zone_ids.len(),
            duplicated = duplicated_rate_ids.len(),
            "Rate duplicated"
        );
        Ok(DuplicateOutcome {
            duplicated_count: duplicated_rate_ids.len(),
            duplicated_rate_ids,
        })
    }
}

// =============================================================================
// Reference Checks
// =============================================================================

/// Which methods and zones named by a batch are missing from the catalog.
#[derive(Debug, Default)]
pub(crate) struct KnownReferences {
    missing_methods: HashSet<i64>,
    missing_zones: HashSet<i64>,
}

impl KnownReferences {
    pub(crate) async fn load(
        tx: &mut CatalogTransaction,
        candidates: &[NewShippingRate],
    ) -> DbResult<Self> {
        let method_ids: BTreeSet<i64> = candidates.iter().map(|c| c.shipping_method_id).collect();
        let zone_ids: Vec<i64> = candidates
            .iter()
            .map(|c| c.shipping_zone_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut missing_methods = HashSet::new();
        for method_id in method_ids {
            if !tx.method_exists(method_id).await? {
                missing_methods.insert(method_id);
            }
        }

        let found: HashSet<i64> = tx.existing_zone_ids(&zone_ids).await?.into_iter().collect();
        let missing_zones = zone_ids.into_iter().filter(|id| !found.contains(id)).collect();

        Ok(KnownReferences {
            missing_methods,
            missing_zones,
        })
    }

    pub(crate) fn check(&self, candidate: &NewShippingRate) -> Result<(), ValidationError> {
        if self.missing_methods.contains(&candidate.shipping_method_id) {
            return Err(ValidationError::unknown(
                "Shipping method",
                candidate.shipping_method_id,
            ));
        }
        if self.missing_zones.contains(&candidate.shipping_zone_id) {
            return Err(ValidationError::unknown("Shipping zone", candidate.shipping_zone_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
