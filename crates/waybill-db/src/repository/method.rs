//! # Method Repository
//!
//! Shipping methods, registered so rates have something to reference.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use waybill_core::{NewShippingMethod, ShippingMethod};

/// Repository for shipping method operations.
#[derive(Debug, Clone)]
pub struct MethodRepository {
    pool: SqlitePool,
}

impl MethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MethodRepository { pool }
    }

    pub async fn insert(&self, method: &NewShippingMethod) -> DbResult<ShippingMethod> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO shipping_methods (
                name, carrier, is_active, display_order, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&method.name)
        .bind(&method.carrier)
        .bind(method.is_active)
        .bind(method.display_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %method.name, carrier = %method.carrier, "Inserted shipping method");

        Ok(ShippingMethod {
            id,
            name: method.name.clone(),
            carrier: method.carrier.clone(),
            is_active: method.is_active,
            display_order: method.display_order,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<ShippingMethod>> {
        let method = sqlx::query_as::<_, ShippingMethod>(
            r#"
            SELECT id, name, carrier, is_active, display_order, created_at, updated_at
            FROM shipping_methods
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    /// All methods in display order.
    pub async fn list(&self) -> DbResult<Vec<ShippingMethod>> {
        let methods = sqlx::query_as::<_, ShippingMethod>(
            r#"
            SELECT id, name, carrier, is_active, display_order, created_at, updated_at
            FROM shipping_methods
            ORDER BY display_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }
}
