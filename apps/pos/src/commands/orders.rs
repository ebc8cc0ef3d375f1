//! # Order Commands
//!
//! Admin order management. Status changes go through the lifecycle state
//! machine and a compare-and-set write, so two screens acting on the same
//! order cannot silently overwrite each other.

use serde::Deserialize;
use tracing::debug;

use kopi_core::OrderStatus;
use kopi_db::{OrderDetail, OrderSummary};

use crate::error::PosResult;
use crate::PosContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: String,
    pub status: OrderStatus,
}

/// Newest orders first. `limit` falls back to `reports.recent_orders_limit`.
pub async fn list_orders(ctx: &PosContext, limit: Option<u32>) -> PosResult<Vec<OrderSummary>> {
    let limit = limit.unwrap_or(ctx.config.reports.recent_orders_limit);
    debug!(limit, "list_orders");
    Ok(ctx.db.orders().list_recent(limit).await?)
}

pub async fn get_order(ctx: &PosContext, order_id: &str) -> PosResult<OrderDetail> {
    Ok(ctx.db.orders().get_detail(order_id).await?)
}

/// ## Errors
/// - `InvalidTransition` when the state machine forbids the move
/// - `ConcurrentUpdate` when the order changed since it was read
/// - `NotFound` for an unknown order
pub async fn update_order_status(
    ctx: &PosContext,
    request: UpdateStatusRequest,
) -> PosResult<OrderDetail> {
    debug!(order_id = %request.order_id, to = %request.status, "update_order_status");

    ctx.db
        .orders()
        .update_status(&request.order_id, request.status)
        .await?;
    Ok(ctx.db.orders().get_detail(&request.order_id).await?)
}

pub async fn count_orders_by_status(ctx: &PosContext, statuses: &[OrderStatus]) -> PosResult<i64> {
    Ok(ctx.db.orders().count_by_status(statuses).await?)
}
