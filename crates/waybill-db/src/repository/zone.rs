//! # Zone Repository
//!
//! Shipping zones. Regions are stored as a JSON array in one TEXT column
//! and are never interpreted here.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use waybill_core::{NewShippingZone, ShippingZone};

/// Row shape of `shipping_zones` before the regions column is decoded.
#[derive(Debug, sqlx::FromRow)]
struct ZoneRow {
    id: i64,
    name: String,
    regions: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ZoneRow> for ShippingZone {
    type Error = DbError;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        Ok(ShippingZone {
            id: row.id,
            name: row.name,
            regions: serde_json::from_str(&row.regions)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for shipping zone operations.
#[derive(Debug, Clone)]
pub struct ZoneRepository {
    pool: SqlitePool,
}

impl ZoneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ZoneRepository { pool }
    }

    pub async fn insert(&self, zone: &NewShippingZone) -> DbResult<ShippingZone> {
        let now = Utc::now();
        let regions = serde_json::to_string(&zone.regions)?;

        let result = sqlx::query(
            r#"
            INSERT INTO shipping_zones (name, regions, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&zone.name)
        .bind(&regions)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %zone.name, "Inserted shipping zone");

        Ok(ShippingZone {
            id,
            name: zone.name.clone(),
            regions: zone.regions.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ShippingZone>> {
        let row = sqlx::query_as::<_, ZoneRow>(
            "SELECT id, name, regions, created_at, updated_at FROM shipping_zones WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShippingZone::try_from).transpose()
    }

    pub async fn list(&self) -> DbResult<Vec<ShippingZone>> {
        let rows = sqlx::query_as::<_, ZoneRow>(
            "SELECT id, name, regions, created_at, updated_at FROM shipping_zones ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ShippingZone::try_from).collect()
    }

    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        exists(&self.pool, id).await
    }
}

pub(crate) async fn exists<'e, E>(executor: E, id: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM shipping_zones WHERE id = ?1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(found.is_some())
}

pub(crate) async fn existing_ids<'e, E>(executor: E, ids: &[i64]) -> DbResult<Vec<i64>>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id FROM shipping_zones WHERE id IN (");
    let mut list = query.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");

    let found = query
        .build_query_scalar::<i64>()
        .fetch_all(executor)
        .await?;

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_regions_roundtrip_through_json() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let zone = db
            .zones()
            .insert(&NewShippingZone {
                name: "Europe".into(),
                regions: vec!["FR".into(), "DE".into()],
            })
            .await
            .unwrap();

        let fetched = db.zones().get_by_id(zone.id).await.unwrap().unwrap();
        assert_eq!(fetched.regions, vec!["FR".to_string(), "DE".to_string()]);
        assert!(db.zones().exists(zone.id).await.unwrap());
        assert!(!db.zones().exists(zone.id + 1).await.unwrap());
        assert_eq!(db.zones().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_regions_surface_as_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO shipping_zones (name, regions, created_at, updated_at) \
             VALUES ('Bad', 'not json', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            db.zones().get_by_id(1).await,
            Err(DbError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_existing_ids_filters_unknown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db
            .zones()
            .insert(&NewShippingZone { name: "A".into(), regions: vec![] })
            .await
            .unwrap();

        let mut found = existing_ids(db.pool(), &[a.id, 500, a.id]).await.unwrap();
        found.sort_unstable();
        assert_eq!(found, vec![a.id]);
    }
}
