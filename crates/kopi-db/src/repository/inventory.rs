//! # Inventory Repository
//!
//! One stock row per product. Checkout does not touch stock; levels are
//! set by restocking and read by the low-stock dashboard count.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kopi_core::InventoryLevel;

#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Sets the stock level for a product, creating the row on first use.
    /// Counts as a restock.
    ///
    /// ## Errors
    /// `ForeignKeyViolation` when the product does not exist.
    pub async fn set_level(&self, product_id: &str, quantity: i64, min_stock_level: i64) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, quantity, min_stock_level, last_restocked_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(product_id) DO UPDATE SET
                quantity = excluded.quantity,
                min_stock_level = excluded.min_stock_level,
                last_restocked_at = excluded.last_restocked_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(min_stock_level)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(product_id = %product_id, quantity, min_stock_level, "Set stock level");
        Ok(())
    }

    pub async fn get_level(&self, product_id: &str) -> DbResult<Option<InventoryLevel>> {
        let level = sqlx::query_as::<_, InventoryLevel>(
            r#"
            SELECT i.product_id, p.name AS product_name, i.quantity,
                   i.min_stock_level, i.last_restocked_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// Products whose quantity is strictly below their minimum, lowest first.
    pub async fn low_stock(&self) -> DbResult<Vec<InventoryLevel>> {
        let levels = sqlx::query_as::<_, InventoryLevel>(
            r#"
            SELECT i.product_id, p.name AS product_name, i.quantity,
                   i.min_stock_level, i.last_restocked_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.quantity < i.min_stock_level
            ORDER BY i.quantity, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    pub async fn count_low_stock(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE quantity < min_stock_level")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
