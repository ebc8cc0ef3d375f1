//! # Report Repository
//!
//! Closed-out daily sales. One row per calendar day; closing the same day
//! again overwrites the figures in place (the row id and date stay).

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kopi_core::{DailySalesReport, SalesSummary};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Stores the summary for `date`, replacing an earlier close of the same day.
    pub async fn upsert_daily(&self, date: NaiveDate, summary: &SalesSummary) -> DbResult<DailySalesReport> {
        sqlx::query(
            r#"
            INSERT INTO daily_sales (
                id, report_date, total_revenue_cents, total_orders,
                total_tax_cents, total_discount_cents, generated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(report_date) DO UPDATE SET
                total_revenue_cents = excluded.total_revenue_cents,
                total_orders = excluded.total_orders,
                total_tax_cents = excluded.total_tax_cents,
                total_discount_cents = excluded.total_discount_cents,
                generated_at = excluded.generated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(date)
        .bind(summary.revenue.cents())
        .bind(summary.order_count)
        .bind(summary.tax.cents())
        .bind(summary.discount.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(
            date = %date,
            revenue = summary.revenue.cents(),
            orders = summary.order_count,
            "Closed day"
        );

        self.get_daily(date)
            .await?
            .ok_or_else(|| DbError::not_found("DailySalesReport", date.to_string()))
    }

    pub async fn get_daily(&self, date: NaiveDate) -> DbResult<Option<DailySalesReport>> {
        let report = sqlx::query_as::<_, DailySalesReport>(
            r#"
            SELECT id, report_date, total_revenue_cents, total_orders,
                   total_tax_cents, total_discount_cents, generated_at
            FROM daily_sales
            WHERE report_date = ?1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    pub async fn count_daily(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
