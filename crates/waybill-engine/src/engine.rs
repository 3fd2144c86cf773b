//! # Rate Engine
//!
//! The public operation surface. Reads go straight to the pool; every
//! write runs under the [`WriteGate`] inside one catalog transaction.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          RateEngine                                     │
//! │                                                                         │
//! │  READ (pool, parallel)            WRITE (gate + transaction)            │
//! │  ─────────────────────            ───────────────────────────           │
//! │  quote ──► resolve ──► cost       create_rate                           │
//! │  quote_kilograms                  update_rate / activate / deactivate   │
//! │  has_conflict                     delete_rate                           │
//! │  get_rate / list_rates            bulk_create ─┐                        │
//! │                                   bulk_update ─┼─► BulkMutation-        │
//! │                                   duplicate ───┘   Coordinator          │
//! │                                                                         │
//! │  register_method / register_zone (so rates have something to point at) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use std::slice;
use tracing::{debug, info};

use waybill_core::validation::{validate_changes, validate_new_rate, validate_query, validate_range};
use waybill_core::{
    pricing, resolver, weight, ConflictSource, ConflictValidator, NewShippingMethod,
    NewShippingRate, NewShippingZone, RateChanges, RateError, RateRange, ShippingMethod,
    ShippingRate, ShippingZone, ValidationError,
};
use waybill_db::Database;

use crate::bulk::{BulkMutationCoordinator, KnownReferences};
use crate::config::{CatalogSettings, EngineConfig};
use crate::error::EngineResult;
use crate::gate::WriteGate;
use crate::outcome::{BulkCreateOutcome, BulkUpdateOutcome, DuplicateOutcome, Quote};

/// Shipping rate engine over one catalog database.
///
/// Cheap to clone; clones share the pool and the write gate.
#[derive(Debug, Clone)]
pub struct RateEngine {
    db: Database,
    gate: WriteGate,
    settings: CatalogSettings,
}

impl RateEngine {
    pub fn new(db: Database, settings: CatalogSettings) -> Self {
        RateEngine {
            db,
            gate: WriteGate::new(),
            settings,
        }
    }

    /// Opens the configured database (running migrations) and builds an
    /// engine over it.
    ///
    /// ```rust,ignore
    /// let config = EngineConfig::load(None)?;
    /// let engine = RateEngine::connect(&config).await?;
    /// let quote = engine.quote(1, 2, 2000, 3000).await?;
    /// ```
    pub async fn connect(config: &EngineConfig) -> EngineResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(Self::new(db, config.catalog))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> CatalogSettings {
        self.settings
    }

    fn bulk(&self) -> BulkMutationCoordinator<'_> {
        BulkMutationCoordinator::new(&self.db, &self.gate, self.settings.max_batch_size)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolves the applicable rate and prices it.
    ///
    /// `weight` is grams, `total` minor currency units.
    pub async fn quote(&self, method_id: i64, zone_id: i64, weight: i64, total: i64) -> EngineResult<Quote> {
        validate_query(weight, total)?;

        let rates = self.db.rates().find_active_for(method_id, zone_id).await?;
        let rate = resolver::resolve(&rates, method_id, zone_id, weight, total)?;
        let cost = pricing::cost(rate, total);

        debug!(
            method_id,
            zone_id,
            weight,
            total,
            rate_id = rate.id,
            cost = cost.cost.minor(),
            free_threshold_met = cost.free_threshold_met,
            "Quoted shipping"
        );

        Ok(Quote::new(rate.clone(), cost))
    }

    /// [`quote`](Self::quote) for callers holding kilograms.
    pub async fn quote_kilograms(
        &self,
        method_id: i64,
        zone_id: i64,
        kilograms: f64,
        total: i64,
    ) -> EngineResult<Quote> {
        let grams = weight::grams_from_kilograms(kilograms)?;
        self.quote(method_id, zone_id, grams, total).await
    }

    /// Whether `range` overlaps an active rate of the pair.
    pub async fn has_conflict(&self, method_id: i64, zone_id: i64, range: &RateRange) -> EngineResult<bool> {
        validate_range(range)?;

        let existing = self.db.rates().find_active_for(method_id, zone_id).await?;
        Ok(ConflictValidator::new(&existing).has_conflict(method_id, zone_id, range))
    }

    // =========================================================================
    // Single Rate Operations
    // =========================================================================

    /// Creates one rate after validation, reference and conflict checks.
    pub async fn create_rate(&self, candidate: &NewShippingRate) -> EngineResult<ShippingRate> {
        validate_new_rate(candidate)?;

        let mut scope = self.gate.open(&self.db).await?;

        KnownReferences::load(&mut scope.tx, slice::from_ref(candidate))
            .await?
            .check(candidate)?;

        let existing = scope
            .tx
            .find_active_for(candidate.shipping_method_id, candidate.shipping_zone_id)
            .await?;
        ConflictValidator::new(&existing)
            .admit(0, candidate)
            .map_err(|reason| reason.into_error(None))?;

        let rate = scope.tx.insert_rate(candidate).await?;
        scope.commit().await?;

        info!(
            rate_id = rate.id,
            method_id = rate.shipping_method_id,
            zone_id = rate.shipping_zone_id,
            "Shipping rate created"
        );
        Ok(rate)
    }

    /// Applies `changes` to one rate and returns the stored result.
    ///
    /// Turning an inactive rate active is conflict-checked like a create.
    pub async fn update_rate(&self, rate_id: i64, changes: RateChanges) -> EngineResult<ShippingRate> {
        if changes.is_empty() {
            return Err(RateError::NoChanges.into());
        }
        validate_changes(&changes)?;

        let mut scope = self.gate.open(&self.db).await?;

        let mut rate = scope
            .tx
            .get_rate(rate_id)
            .await?
            .ok_or(RateError::RateNotFound(rate_id))?;

        let was_active = rate.is_active;
        changes.apply_to(&mut rate, Utc::now());

        if rate.is_active && !was_active {
            let (method_id, zone_id) = (rate.shipping_method_id, rate.shipping_zone_id);
            let active = scope.tx.find_active_for(method_id, zone_id).await?;
            if let Some(other) = ConflictValidator::new(&active).conflicting_rate(
                method_id,
                zone_id,
                &rate.range(),
                Some(rate_id),
            ) {
                return Err(RateError::Conflict {
                    index: None,
                    with: ConflictSource::ExistingRate { rate_id: other.id },
                }
                .into());
            }
        }

        scope.tx.update_rate(&rate).await?;
        scope.commit().await?;

        info!(rate_id, is_active = rate.is_active, "Shipping rate updated");
        Ok(rate)
    }

    pub async fn activate(&self, rate_id: i64) -> EngineResult<ShippingRate> {
        self.update_rate(rate_id, RateChanges::default().active(true)).await
    }

    pub async fn deactivate(&self, rate_id: i64) -> EngineResult<ShippingRate> {
        self.update_rate(rate_id, RateChanges::default().active(false)).await
    }

    /// Hard delete.
    pub async fn delete_rate(&self, rate_id: i64) -> EngineResult<()> {
        let mut scope = self.gate.open(&self.db).await?;

        if !scope.tx.delete_rate(rate_id).await? {
            return Err(RateError::RateNotFound(rate_id).into());
        }
        scope.commit().await?;

        info!(rate_id, "Shipping rate deleted");
        Ok(())
    }

    pub async fn get_rate(&self, rate_id: i64) -> EngineResult<ShippingRate> {
        self.db
            .rates()
            .get_by_id(rate_id)
            .await?
            .ok_or_else(|| RateError::RateNotFound(rate_id).into())
    }

    /// Every rate of a pair, inactive included.
    pub async fn list_rates(&self, method_id: i64, zone_id: i64) -> EngineResult<Vec<ShippingRate>> {
        Ok(self.db.rates().list_for(method_id, zone_id).await?)
    }

    // =========================================================================
    // Bulk Operations
    // =========================================================================

    pub async fn bulk_create(&self, candidates: &[NewShippingRate]) -> EngineResult<BulkCreateOutcome> {
        self.bulk().bulk_create(candidates).await
    }

    pub async fn bulk_update(&self, rate_ids: &[i64], changes: RateChanges) -> EngineResult<BulkUpdateOutcome> {
        self.bulk().bulk_update(rate_ids, changes).await
    }

    pub async fn duplicate(&self, source_rate_id: i64, target_zone_ids: &[i64]) -> EngineResult<DuplicateOutcome> {
        self.bulk().duplicate(source_rate_id, target_zone_ids).await
    }

    // =========================================================================
    // Referenced Entities
    // =========================================================================

    pub async fn register_method(&self, method: &NewShippingMethod) -> EngineResult<ShippingMethod> {
        if method.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }
        Ok(self.db.methods().insert(method).await?)
    }

    pub async fn register_zone(&self, zone: &NewShippingZone) -> EngineResult<ShippingZone> {
        if zone.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "name".to_string(),
            }
            .into());
        }
        Ok(self.db.zones().insert(zone).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EngineError, ErrorCode};
    use waybill_core::{Interval, Money};

    /// Engine with method 1 and zones 1..=3.
    async fn engine() -> RateEngine {
        let engine = RateEngine::connect(&EngineConfig::in_memory()).await.unwrap();
        engine
            .register_method(&NewShippingMethod {
                name: "Standard".into(),
                carrier: "Royal Mail".into(),
                is_active: true,
                display_order: 0,
            })
            .await
            .unwrap();
        for name in ["Domestic", "Europe", "World"] {
            engine
                .register_zone(&NewShippingZone {
                    name: name.into(),
                    regions: vec![],
                })
                .await
                .unwrap();
        }
        engine
    }

    fn bounded(w: (i64, i64), t: (i64, i64)) -> RateRange {
        RateRange::new(Interval::new(w.0, Some(w.1)), Interval::new(t.0, Some(t.1)))
    }

    fn code(err: EngineError) -> ErrorCode {
        err.code()
    }

    #[tokio::test]
    async fn test_resolution_scenario() {
        let engine = engine().await;

        let a = engine
            .create_rate(&NewShippingRate::new(1, 2, bounded((0, 5000), (0, 5000)), 500))
            .await
            .unwrap();

        let quote = engine.quote(1, 2, 2000, 3000).await.unwrap();
        assert_eq!(quote.rate.id, a.id);
        assert_eq!(quote.cost, Money::from_minor(500));
        assert!(!quote.is_free);

        let overlapping = NewShippingRate::new(1, 2, bounded((2000, 8000), (0, 5000)), 700);
        assert!(engine.has_conflict(1, 2, &overlapping.range()).await.unwrap());
        let err = engine.create_rate(&overlapping).await.unwrap_err();
        assert!(matches!(
            err.as_rate_error(),
            Some(RateError::Conflict {
                index: None,
                with: ConflictSource::ExistingRate { .. }
            })
        ));
        assert_eq!(code(err), ErrorCode::Conflict);

        let adjacent = NewShippingRate::new(1, 2, bounded((5001, 10000), (0, 5000)), 900);
        assert!(!engine.has_conflict(1, 2, &adjacent.range()).await.unwrap());
        let b = engine.create_rate(&adjacent).await.unwrap();

        assert_eq!(engine.quote(1, 2, 7000, 100).await.unwrap().rate.id, b.id);
        assert_eq!(engine.list_rates(1, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_quote_failures() {
        let engine = engine().await;
        engine
            .create_rate(&NewShippingRate::new(1, 2, bounded((0, 5000), (0, 5000)), 500))
            .await
            .unwrap();

        assert_eq!(
            code(engine.quote(1, 2, 9000, 100).await.unwrap_err()),
            ErrorCode::NotFound
        );
        assert_eq!(
            code(engine.quote(1, 3, 100, 100).await.unwrap_err()),
            ErrorCode::NotFound
        );
        assert_eq!(
            code(engine.quote(1, 2, -1, 100).await.unwrap_err()),
            ErrorCode::ValidationError
        );
        assert_eq!(
            code(engine.quote_kilograms(1, 2, f64::NAN, 100).await.unwrap_err()),
            ErrorCode::ValidationError
        );
    }

    #[tokio::test]
    async fn test_free_threshold_quotes() {
        let engine = engine().await;
        let range = RateRange::new(Interval::at_least(0), Interval::at_least(0));
        engine
            .create_rate(&NewShippingRate::new(1, 1, range, 395).with_free_threshold(5000))
            .await
            .unwrap();

        let below = engine.quote(1, 1, 100, 4999).await.unwrap();
        assert_eq!(below.cost.minor(), 395);
        assert!(!below.free_threshold_met);

        let at = engine.quote_kilograms(1, 1, 2.5, 5000).await.unwrap();
        assert_eq!(at.cost, Money::zero());
        assert!(at.is_free);
        assert!(at.free_threshold_met);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let engine = engine().await;

        let inverted = NewShippingRate::new(1, 1, bounded((10, 5), (0, 100)), 100);
        assert_eq!(
            code(engine.create_rate(&inverted).await.unwrap_err()),
            ErrorCode::ValidationError
        );

        let unknown_zone = NewShippingRate::new(1, 99, bounded((0, 5), (0, 100)), 100);
        let err = engine.create_rate(&unknown_zone).await.unwrap_err();
        assert!(matches!(
            err.as_rate_error(),
            Some(RateError::Validation(ValidationError::UnknownReference { id: 99, .. }))
        ));

        let unknown_method = NewShippingRate::new(7, 1, bounded((0, 5), (0, 100)), 100);
        assert_eq!(
            code(engine.create_rate(&unknown_method).await.unwrap_err()),
            ErrorCode::ValidationError
        );

        assert!(engine.list_rates(1, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_rates_neither_resolve_nor_conflict() {
        let engine = engine().await;
        let a = engine
            .create_rate(&NewShippingRate::new(1, 2, bounded((0, 5000), (0, 5000)), 500))
            .await
            .unwrap();

        engine.deactivate(a.id).await.unwrap();
        assert_eq!(
            code(engine.quote(1, 2, 100, 100).await.unwrap_err()),
            ErrorCode::NotFound
        );

        // Same bracket is free to take while A is inactive
        let b = engine
            .create_rate(&NewShippingRate::new(1, 2, bounded((0, 5000), (0, 5000)), 450))
            .await
            .unwrap();

        // Reactivating A would overlap B
        let err = engine.activate(a.id).await.unwrap_err();
        assert!(matches!(
            err.as_rate_error(),
            Some(RateError::Conflict {
                with: ConflictSource::ExistingRate { rate_id },
                ..
            }) if *rate_id == b.id
        ));
        assert!(!engine.get_rate(a.id).await.unwrap().is_active);

        engine.deactivate(b.id).await.unwrap();
        assert!(engine.activate(a.id).await.unwrap().is_active);
        assert_eq!(engine.quote(1, 2, 100, 100).await.unwrap().rate.id, a.id);
    }

    #[tokio::test]
    async fn test_update_rate() {
        let engine = engine().await;
        let a = engine
            .create_rate(
                &NewShippingRate::new(1, 1, bounded((0, 1000), (0, 1000)), 300).with_free_threshold(800),
            )
            .await
            .unwrap();

        let updated = engine
            .update_rate(a.id, RateChanges::default().rate(350).free_threshold(None))
            .await
            .unwrap();
        assert_eq!(updated.rate, 350);
        assert_eq!(updated.free_threshold, None);

        let stored = engine.get_rate(a.id).await.unwrap();
        assert_eq!(stored, updated);
        assert_eq!(engine.quote(1, 1, 10, 900).await.unwrap().cost.minor(), 350);

        assert_eq!(
            code(engine.update_rate(a.id, RateChanges::default()).await.unwrap_err()),
            ErrorCode::NotApplicable
        );
        assert_eq!(
            code(engine.update_rate(a.id, RateChanges::default().rate(-1)).await.unwrap_err()),
            ErrorCode::ValidationError
        );
        assert_eq!(
            code(engine.update_rate(404, RateChanges::default().rate(1)).await.unwrap_err()),
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_rate() {
        let engine = engine().await;
        let a = engine
            .create_rate(&NewShippingRate::new(1, 1, bounded((0, 10), (0, 10)), 1))
            .await
            .unwrap();

        engine.delete_rate(a.id).await.unwrap();
        assert_eq!(code(engine.get_rate(a.id).await.unwrap_err()), ErrorCode::NotFound);
        assert_eq!(code(engine.delete_rate(a.id).await.unwrap_err()), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_register_requires_name() {
        let engine = engine().await;
        let err = engine
            .register_zone(&NewShippingZone {
                name: "  ".into(),
                regions: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(code(err), ErrorCode::ValidationError);
    }
}
