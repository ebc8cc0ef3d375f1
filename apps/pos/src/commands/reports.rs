//! # Report Commands
//!
//! Sales reports and the admin dashboard. Everything here is a read over
//! committed orders except [`close_day`], which stores the day's summary
//! and may be re-run.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use kopi_core::sales::{summarize, top_products};
use kopi_core::{DailySalesReport, Money, OrderStatus, ProductSales, SalesSummary, SalesWindow};

use crate::error::PosResult;
use crate::PosContext;

/// Orders with this status count as sales.
const SALES_STATUS: OrderStatus = OrderStatus::Completed;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: NaiveDate,
    pub summary: SalesSummary,
    pub top_products: Vec<ProductSales>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today_revenue: Money,
    pub today_orders: i64,
    /// Pending plus preparing.
    pub open_orders: i64,
    pub low_stock_items: i64,
}

/// Completed-order summary for one UTC day plus its best sellers.
pub async fn daily_report(ctx: &PosContext, date: NaiveDate) -> PosResult<DailyReport> {
    let window = SalesWindow::for_day(date);
    let orders = ctx.db.orders().list_in_window(&window).await?;
    let summary = summarize(&orders, &window, SALES_STATUS);

    let items = ctx.db.orders().items_in_window(&window, SALES_STATUS).await?;
    let top_products = top_products(&items, ctx.config.reports.top_products);

    debug!(
        date = %date,
        orders = summary.order_count,
        products = top_products.len(),
        "daily_report"
    );

    Ok(DailyReport {
        date,
        summary,
        top_products,
    })
}

/// Stores the day's summary. Running it again replaces the stored figures.
pub async fn close_day(ctx: &PosContext, date: NaiveDate) -> PosResult<DailySalesReport> {
    let report = daily_report(ctx, date).await?;
    let stored = ctx.db.reports().upsert_daily(date, &report.summary).await?;
    info!(date = %date, report_id = %stored.id, "close_day");
    Ok(stored)
}

/// `Metric,Value` CSV of the day's summary in the store currency.
pub async fn export_csv(ctx: &PosContext, date: NaiveDate) -> PosResult<String> {
    let report = daily_report(ctx, date).await?;
    Ok(report.summary.to_csv(&ctx.config.store.currency_symbol))
}

pub async fn dashboard(ctx: &PosContext, today: NaiveDate) -> PosResult<Dashboard> {
    let window = SalesWindow::for_day(today);
    let orders = ctx.db.orders().list_in_window(&window).await?;
    let summary = summarize(&orders, &window, SALES_STATUS);

    let open_orders = ctx
        .db
        .orders()
        .count_by_status(&[OrderStatus::Pending, OrderStatus::Preparing])
        .await?;
    let low_stock_items = ctx.db.inventory().count_low_stock().await?;

    Ok(Dashboard {
        today_revenue: summary.revenue,
        today_orders: summary.order_count,
        open_orders,
        low_stock_items,
    })
}
