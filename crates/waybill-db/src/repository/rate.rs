//! # Rate Repository
//!
//! The persisted rate catalog.
//!
//! ## Access Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  RateRepository (pool)              CatalogTransaction (one conn)       │
//! │  ─────────────────────              ──────────────────────────────      │
//! │  quote, get, list                   bulk create, duplicate, update      │
//! │       │                                     │                           │
//! │       └──────────────┬──────────────────────┘                           │
//! │                      ▼                                                  │
//! │       fetch_* / insert_rate / update_rate / delete_rate                 │
//! │       (generic over SqliteExecutor, one SQL text per operation)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use waybill_core::{NewShippingRate, ShippingRate};

const RATE_COLUMNS: &str = "id, shipping_method_id, shipping_zone_id, \
     min_weight, max_weight, min_total, max_total, \
     rate, free_threshold, is_active, created_at, updated_at";

/// Repository for shipping rate operations outside a transaction.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    /// Creates a new RateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RateRepository { pool }
    }

    /// Gets a rate by ID, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ShippingRate>> {
        fetch_by_id(&self.pool, id).await
    }

    /// Active rates of one method/zone pair: the resolver's input.
    pub async fn find_active_for(&self, method_id: i64, zone_id: i64) -> DbResult<Vec<ShippingRate>> {
        fetch_active_for(&self.pool, method_id, zone_id).await
    }

    /// Every rate of a pair, inactive included, in bracket order.
    pub async fn list_for(&self, method_id: i64, zone_id: i64) -> DbResult<Vec<ShippingRate>> {
        let sql = format!(
            "SELECT {RATE_COLUMNS} FROM shipping_rates \
             WHERE shipping_method_id = ?1 AND shipping_zone_id = ?2 \
             ORDER BY min_total, min_weight, id"
        );

        let rates = sqlx::query_as::<_, ShippingRate>(&sql)
            .bind(method_id)
            .bind(zone_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rates)
    }

    /// Inserts a rate without any conflict check.
    ///
    /// Only for trusted loaders (seed data, imports). Engine writes go
    /// through a [`CatalogTransaction`](crate::CatalogTransaction).
    pub async fn insert(&self, candidate: &NewShippingRate) -> DbResult<ShippingRate> {
        insert_rate(&self.pool, candidate).await
    }

    /// Counts all rates.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shipping_rates")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Executor-generic queries
// =============================================================================

pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: i64) -> DbResult<Option<ShippingRate>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {RATE_COLUMNS} FROM shipping_rates WHERE id = ?1");

    let rate = sqlx::query_as::<_, ShippingRate>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(rate)
}

pub(crate) async fn fetch_by_ids<'e, E>(executor: E, ids: &[i64]) -> DbResult<Vec<ShippingRate>>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {RATE_COLUMNS} FROM shipping_rates WHERE id IN ("));
    let mut list = query.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(") ORDER BY id");

    let rates = query
        .build_query_as::<ShippingRate>()
        .fetch_all(executor)
        .await?;

    Ok(rates)
}

pub(crate) async fn fetch_active_for<'e, E>(
    executor: E,
    method_id: i64,
    zone_id: i64,
) -> DbResult<Vec<ShippingRate>>
where
    E: SqliteExecutor<'e>,
{
    debug!(method_id, zone_id, "Loading active rates");

    let sql = format!(
        "SELECT {RATE_COLUMNS} FROM shipping_rates \
         WHERE shipping_method_id = ?1 AND shipping_zone_id = ?2 AND is_active = 1 \
         ORDER BY id"
    );

    let rates = sqlx::query_as::<_, ShippingRate>(&sql)
        .bind(method_id)
        .bind(zone_id)
        .fetch_all(executor)
        .await?;

    Ok(rates)
}

/// Active rates of one method across several zones.
pub(crate) async fn fetch_active_for_zones<'e, E>(
    executor: E,
    method_id: i64,
    zone_ids: &[i64],
) -> DbResult<Vec<ShippingRate>>
where
    E: SqliteExecutor<'e>,
{
    if zone_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {RATE_COLUMNS} FROM shipping_rates WHERE is_active = 1 AND shipping_method_id = "
    ));
    query.push_bind(method_id);
    query.push(" AND shipping_zone_id IN (");
    let mut list = query.separated(", ");
    for zone_id in zone_ids {
        list.push_bind(*zone_id);
    }
    list.push_unseparated(") ORDER BY id");

    let rates = query
        .build_query_as::<ShippingRate>()
        .fetch_all(executor)
        .await?;

    Ok(rates)
}

pub(crate) async fn insert_rate<'e, E>(
    executor: E,
    candidate: &NewShippingRate,
) -> DbResult<ShippingRate>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO shipping_rates (
            shipping_method_id, shipping_zone_id,
            min_weight, max_weight, min_total, max_total,
            rate, free_threshold, is_active,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(candidate.shipping_method_id)
    .bind(candidate.shipping_zone_id)
    .bind(candidate.min_weight)
    .bind(candidate.max_weight)
    .bind(candidate.min_total)
    .bind(candidate.max_total)
    .bind(candidate.rate)
    .bind(candidate.free_threshold)
    .bind(candidate.is_active)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    let id = result.last_insert_rowid();
    debug!(
        id,
        method_id = candidate.shipping_method_id,
        zone_id = candidate.shipping_zone_id,
        "Inserted shipping rate"
    );

    Ok(candidate.clone().into_rate(id, now))
}

/// Writes back the mutable fields of `rate`. Returns whether the row existed.
pub(crate) async fn update_rate<'e, E>(executor: E, rate: &ShippingRate) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id = rate.id, is_active = rate.is_active, "Updating shipping rate");

    let result = sqlx::query(
        r#"
        UPDATE shipping_rates
        SET rate = ?2, free_threshold = ?3, is_active = ?4, updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(rate.id)
    .bind(rate.rate)
    .bind(rate.free_threshold)
    .bind(rate.is_active)
    .bind(rate.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_rate<'e, E>(executor: E, id: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    debug!(id, "Deleting shipping rate");

    let result = sqlx::query("DELETE FROM shipping_rates WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use waybill_core::{Interval, NewShippingMethod, NewShippingZone, RateRange};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let method = db
            .methods()
            .insert(&NewShippingMethod {
                name: "Standard".into(),
                carrier: "Royal Mail".into(),
                is_active: true,
                display_order: 0,
            })
            .await
            .unwrap();
        let zone = db
            .zones()
            .insert(&NewShippingZone {
                name: "UK".into(),
                regions: vec!["GB".into()],
            })
            .await
            .unwrap();
        (db, method.id, zone.id)
    }

    fn bracket(w: (i64, Option<i64>), t: (i64, Option<i64>)) -> RateRange {
        RateRange::new(Interval::new(w.0, w.1), Interval::new(t.0, t.1))
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let (db, method, zone) = setup().await;

        let candidate = NewShippingRate::new(method, zone, bracket((0, Some(5000)), (0, None)), 500)
            .with_free_threshold(7500);
        let inserted = db.rates().insert(&candidate).await.unwrap();

        let fetched = db.rates().get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched.max_weight, Some(5000));
        assert_eq!(fetched.max_total, None);
        assert_eq!(fetched.free_threshold, Some(7500));
        assert!(fetched.is_active);
        assert_eq!(fetched.created_at.timestamp(), inserted.created_at.timestamp());

        assert!(db.rates().get_by_id(inserted.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_active_for_filters_pair_and_status() {
        let (db, method, zone) = setup().await;
        let other_zone = db
            .zones()
            .insert(&NewShippingZone {
                name: "EU".into(),
                regions: vec![],
            })
            .await
            .unwrap();

        let repo = db.rates();
        let a = repo
            .insert(&NewShippingRate::new(method, zone, bracket((0, Some(999)), (0, None)), 300))
            .await
            .unwrap();
        repo.insert(
            &NewShippingRate::new(method, zone, bracket((1000, None), (0, None)), 600).inactive(),
        )
        .await
        .unwrap();
        repo.insert(&NewShippingRate::new(method, other_zone.id, bracket((0, None), (0, None)), 900))
            .await
            .unwrap();

        let active = repo.find_active_for(method, zone).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);

        assert_eq!(repo.list_for(method, zone).await.unwrap().len(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_method_is_foreign_key_violation() {
        let (db, _, zone) = setup().await;
        let result = db
            .rates()
            .insert(&NewShippingRate::new(999, zone, bracket((0, None), (0, None)), 100))
            .await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_inverted_range() {
        let (db, method, zone) = setup().await;
        let result = db
            .rates()
            .insert(&NewShippingRate::new(method, zone, bracket((10, Some(5)), (0, None)), 100))
            .await;
        assert!(matches!(result, Err(DbError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_fetch_by_ids_and_zones() {
        let (db, method, zone) = setup().await;
        let repo = db.rates();
        let a = repo
            .insert(&NewShippingRate::new(method, zone, bracket((0, Some(10)), (0, None)), 1))
            .await
            .unwrap();
        let b = repo
            .insert(&NewShippingRate::new(method, zone, bracket((11, Some(20)), (0, None)), 2))
            .await
            .unwrap();

        let found = fetch_by_ids(db.pool(), &[b.id, a.id, 4242]).await.unwrap();
        assert_eq!(found.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a.id, b.id]);
        assert!(fetch_by_ids(db.pool(), &[]).await.unwrap().is_empty());

        let by_zone = fetch_active_for_zones(db.pool(), method, &[zone, 77]).await.unwrap();
        assert_eq!(by_zone.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, method, zone) = setup().await;
        let mut rate = db
            .rates()
            .insert(&NewShippingRate::new(method, zone, bracket((0, None), (0, None)), 100))
            .await
            .unwrap();

        rate.rate = 250;
        rate.is_active = false;
        assert!(update_rate(db.pool(), &rate).await.unwrap());

        let stored = db.rates().get_by_id(rate.id).await.unwrap().unwrap();
        assert_eq!(stored.rate, 250);
        assert!(!stored.is_active);

        assert!(delete_rate(db.pool(), rate.id).await.unwrap());
        assert!(!delete_rate(db.pool(), rate.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_transaction_scoped_insert_rolls_back() {
        let (db, method, zone) = setup().await;

        let mut tx = db.begin().await.unwrap();
        tx.insert_rate(&NewShippingRate::new(method, zone, bracket((0, None), (0, None)), 100))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.rates().count().await.unwrap(), 0);
    }
}
