//! # Catalog Transaction
//!
//! One SQLite transaction covering every read and write of a mutating
//! workflow. The engine opens it while holding its write gate, so the
//! snapshot it validates against is the snapshot it inserts into.
//!
//! ```text
//! let mut tx = db.begin().await?;
//! let existing = tx.find_active_for(method, zone).await?;   ─┐ same
//! ... validate candidates against `existing` ...              │ connection,
//! tx.insert_rate(&candidate).await?;                          │ same
//! tx.commit().await?;                                        ─┘ snapshot
//! ```
//!
//! Dropping the handle without `commit` rolls everything back.

use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{rate, zone};
use waybill_core::{NewShippingRate, ShippingRate};

/// Transaction-scoped access to rates, methods and zones.
pub struct CatalogTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl CatalogTransaction {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        CatalogTransaction { tx }
    }

    pub async fn get_rate(&mut self, id: i64) -> DbResult<Option<ShippingRate>> {
        rate::fetch_by_id(&mut *self.tx, id).await
    }

    /// Existing rates among `ids`, in id order. Unknown ids are absent.
    pub async fn get_rates(&mut self, ids: &[i64]) -> DbResult<Vec<ShippingRate>> {
        rate::fetch_by_ids(&mut *self.tx, ids).await
    }

    pub async fn find_active_for(&mut self, method_id: i64, zone_id: i64) -> DbResult<Vec<ShippingRate>> {
        rate::fetch_active_for(&mut *self.tx, method_id, zone_id).await
    }

    /// Active rates of `method_id` in any of `zone_ids`.
    pub async fn find_active_for_zones(
        &mut self,
        method_id: i64,
        zone_ids: &[i64],
    ) -> DbResult<Vec<ShippingRate>> {
        rate::fetch_active_for_zones(&mut *self.tx, method_id, zone_ids).await
    }

    pub async fn insert_rate(&mut self, candidate: &NewShippingRate) -> DbResult<ShippingRate> {
        rate::insert_rate(&mut *self.tx, candidate).await
    }

    pub async fn update_rate(&mut self, rate: &ShippingRate) -> DbResult<bool> {
        rate::update_rate(&mut *self.tx, rate).await
    }

    pub async fn delete_rate(&mut self, id: i64) -> DbResult<bool> {
        rate::delete_rate(&mut *self.tx, id).await
    }

    pub async fn method_exists(&mut self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM shipping_methods WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(found.is_some())
    }

    /// The subset of `ids` naming existing zones.
    pub async fn existing_zone_ids(&mut self, ids: &[i64]) -> DbResult<Vec<i64>> {
        zone::existing_ids(&mut *self.tx, ids).await
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Catalog transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!("Catalog transaction rolled back");
        Ok(())
    }
}
