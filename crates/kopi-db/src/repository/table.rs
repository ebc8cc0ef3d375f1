//! # Table Repository
//!
//! Dining tables for dine-in orders. Orders reference tables weakly: the
//! schema sets `orders.table_id` to NULL when a table is deleted, and the
//! copied `table_number` keeps the order readable.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use kopi_core::DiningTable;

#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Creates a table.
    ///
    /// ## Errors
    /// `UniqueViolation` when the table number is taken.
    pub async fn create(&self, table_number: &str, capacity: i64, qr_code: &str) -> DbResult<DiningTable> {
        let table = DiningTable {
            id: Uuid::new_v4().to_string(),
            table_number: table_number.to_string(),
            capacity,
            qr_code: qr_code.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO dining_tables (id, table_number, capacity, qr_code, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&table.id)
        .bind(&table.table_number)
        .bind(table.capacity)
        .bind(&table.qr_code)
        .bind(table.is_active)
        .bind(table.created_at)
        .execute(&self.pool)
        .await?;

        info!(table_number = %table.table_number, "Created dining table");
        Ok(table)
    }

    /// All tables, ordered by number (numeric numbers sort numerically).
    pub async fn list(&self) -> DbResult<Vec<DiningTable>> {
        let tables = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, table_number, capacity, qr_code, is_active, created_at
            FROM dining_tables
            ORDER BY LENGTH(table_number), table_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            "SELECT id, table_number, capacity, qr_code, is_active, created_at FROM dining_tables WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Looks up the table a scanned QR payload points at.
    pub async fn get_by_number(&self, table_number: &str) -> DbResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, table_number, capacity, qr_code, is_active, created_at
            FROM dining_tables
            WHERE table_number = ?1
            "#,
        )
        .bind(table_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Deletes a table. Returns `false` when it did not exist.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM dining_tables WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        debug!(id = %id, deleted, "Delete dining table");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.tables();

        let t = tables
            .create("7", 2, "http://localhost:8080/pos?table=7")
            .await
            .unwrap();

        let by_id = tables.get_by_id(&t.id).await.unwrap().unwrap();
        assert_eq!(by_id.table_number, "7");
        assert_eq!(by_id.capacity, 2);
        assert!(by_id.is_active);

        let by_number = tables.get_by_number("7").await.unwrap().unwrap();
        assert_eq!(by_number.id, t.id);
        assert!(tables.get_by_number("8").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sorts_numerically() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.tables();

        for n in ["10", "2", "1"] {
            tables.create(n, 4, "qr").await.unwrap();
        }

        let numbers: Vec<_> = tables
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.table_number)
            .collect();
        assert_eq!(numbers, vec!["1", "2", "10"]);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.tables();

        tables.create("3", 4, "qr").await.unwrap();
        let err = tables.create("3", 6, "qr").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.tables();

        let t = tables.create("5", 4, "qr").await.unwrap();
        assert!(tables.delete(&t.id).await.unwrap());
        assert!(!tables.delete(&t.id).await.unwrap());
        assert!(tables.get_by_id(&t.id).await.unwrap().is_none());
    }
}
