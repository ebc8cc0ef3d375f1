//! # Table Commands
//!
//! Table management and QR binding. A table's QR payload routes a customer
//! session straight into dine-in ordering for that table.

use tracing::{debug, info};

use kopi_core::table::{parse_qr_payload, qr_payload};
use kopi_core::validation::{validate_capacity, validate_table_number};
use kopi_core::{DiningTable, TableBinding};
use kopi_db::DbError;

use crate::error::PosResult;
use crate::state::Session;
use crate::PosContext;

const DEFAULT_CAPACITY: i64 = 4;

/// ## Errors
/// - `Validation` for a malformed number or a capacity outside 1..=50
/// - `UniqueViolation` when the number is taken
pub async fn create_table(
    ctx: &PosContext,
    table_number: &str,
    capacity: Option<i64>,
) -> PosResult<DiningTable> {
    let number = validate_table_number(table_number)?;
    let capacity = capacity.unwrap_or(DEFAULT_CAPACITY);
    validate_capacity(capacity)?;

    let qr_code = qr_payload(&ctx.config.pos.origin, &number);
    let table = ctx.db.tables().create(&number, capacity, &qr_code).await?;

    info!(table_number = %table.table_number, capacity, "Created table");
    Ok(table)
}

pub async fn list_tables(ctx: &PosContext) -> PosResult<Vec<DiningTable>> {
    Ok(ctx.db.tables().list().await?)
}

/// Removes a table. Orders placed at it keep their table number.
///
/// Returns `false` when no such table exists.
pub async fn delete_table(ctx: &PosContext, table_id: &str) -> PosResult<bool> {
    let deleted = ctx.db.tables().delete(table_id).await?;
    debug!(table_id, deleted, "delete_table");
    Ok(deleted)
}

/// Binds a session to the table named by a scanned QR payload or a typed
/// table number.
///
/// ## Errors
/// - `InvalidTablePayload` for a URL that is not a table QR code
/// - `NotFound` when no active table has that number
pub async fn bind_session_to_table(
    ctx: &PosContext,
    session: &mut Session,
    scanned: &str,
) -> PosResult<TableBinding> {
    let number = if scanned.contains("://") {
        parse_qr_payload(scanned)?
    } else {
        validate_table_number(scanned)?
    };

    let table = ctx
        .db
        .tables()
        .get_by_number(&number)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| DbError::not_found("Table", number.as_str()))?;

    let binding = TableBinding::from(&table);
    session.bind_table(binding.clone());

    info!(session_id = %session.id(), table_number = %binding.table_number, "Session bound to table");
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, AddToCartRequest};
    use crate::commands::checkout::{checkout, CheckoutRequest};
    use crate::commands::test_support::fixture;
    use crate::error::PosError;
    use kopi_core::{CoreError, OrderChannel, OrderType, PaymentInput, PaymentMethod};

    #[tokio::test]
    async fn test_create_and_list() {
        let f = fixture().await;

        let table = create_table(&f.ctx, " 12 ", None).await.unwrap();
        assert_eq!(table.table_number, "12");
        assert_eq!(table.capacity, 4);
        assert_eq!(table.qr_code, "http://localhost:8080/pos?table=12");

        create_table(&f.ctx, "2", Some(2)).await.unwrap();
        let numbers: Vec<String> = list_tables(&f.ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.table_number)
            .collect();
        assert_eq!(numbers, vec!["2", "12"]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let f = fixture().await;

        let err = create_table(&f.ctx, "5", Some(0)).await.unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));

        create_table(&f.ctx, "5", None).await.unwrap();
        let err = create_table(&f.ctx, "5", None).await.unwrap_err();
        assert!(matches!(
            err,
            PosError::Persistence(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_bind_by_qr_and_number() {
        let f = fixture().await;
        let table = create_table(&f.ctx, "7", None).await.unwrap();
        let mut session = Session::new(OrderChannel::Customer);

        let binding = bind_session_to_table(&f.ctx, &mut session, &table.qr_code)
            .await
            .unwrap();
        assert_eq!(binding.table_id.as_deref(), Some(table.id.as_str()));
        assert_eq!(session.table(), Some(&binding));

        session.unbind_table();
        bind_session_to_table(&f.ctx, &mut session, "7").await.unwrap();
        assert_eq!(session.table().map(|t| t.table_number.as_str()), Some("7"));
    }

    #[tokio::test]
    async fn test_bind_unknown_table() {
        let f = fixture().await;
        let mut session = Session::new(OrderChannel::Customer);

        let err = bind_session_to_table(&f.ctx, &mut session, "http://localhost:8080/pos?table=99")
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Persistence(DbError::NotFound { .. })));

        let err = bind_session_to_table(&f.ctx, &mut session, "http://localhost:8080/menu")
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::InvalidTablePayload(_))));
        assert!(session.table().is_none());
    }

    #[tokio::test]
    async fn test_delete_keeps_orders() {
        let f = fixture().await;
        let table = create_table(&f.ctx, "4", None).await.unwrap();
        let mut session = Session::new(OrderChannel::Customer);
        bind_session_to_table(&f.ctx, &mut session, "4").await.unwrap();

        add_to_cart(
            &f.ctx,
            &session,
            AddToCartRequest {
                product_id: f.croissant.id.clone(),
                quantity: 1,
                size: None,
                temperature: None,
                add_on_ids: Vec::new(),
            },
        )
        .await
        .unwrap();
        let receipt = checkout(
            &f.ctx,
            &session,
            CheckoutRequest::new(PaymentInput::non_cash(PaymentMethod::Card)),
        )
        .await
        .unwrap();

        assert!(delete_table(&f.ctx, &table.id).await.unwrap());
        assert!(!delete_table(&f.ctx, &table.id).await.unwrap());

        let order = f.ctx.db.orders().get_by_id(&receipt.order_id).await.unwrap().unwrap();
        assert_eq!(order.table_id, None);
        assert_eq!(order.table_number.as_deref(), Some("4"));
        assert_eq!(order.order_type, OrderType::DineIn);
    }
}
