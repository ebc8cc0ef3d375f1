//! # Order Repository
//!
//! Orders, their items and payments.
//!
//! ## Checkout Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record_checkout (one transaction)                    │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── order_counters: day → next seq     ORD-YYYYMMDD-NNNN            │
//! │    ├── INSERT orders           ──fail──► ROLLBACK, plain error         │
//! │    ├── INSERT order_items × N  ──fail──► ROLLBACK, PartialWrite(items) │
//! │    ├── INSERT payments         ──fail──► ROLLBACK, PartialWrite(payment)│
//! │    │                                                                    │
//! │  COMMIT                        ──fail──► PartialWrite(commit)          │
//! │                                                                         │
//! │  Nothing is visible to other sessions until COMMIT. Dropping the       │
//! │  future before COMMIT drops the transaction, which rolls it back.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Changes
//! `update_status` checks the transition against the order state machine,
//! then writes with compare-and-set on `(status, version)`. A writer that
//! read an older version loses with `StaleWrite` instead of overwriting.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{CheckoutStage, DbError, DbResult};
use kopi_core::lifecycle::{validate_transition, Transition};
use kopi_core::{
    Order, OrderDraft, OrderItem, OrderStatus, Payment, PaymentStatus, SalesWindow,
    ORDER_NUMBER_PREFIX,
};

const ORDER_COLUMNS: &str = "id, order_number, order_type, channel, table_id, table_number, \
     staff_id, subtotal_cents, tax_cents, discount_cents, total_cents, status, notes, version, \
     created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, unit_price_cents, quantity, \
     subtotal_cents, add_ons, variant_details, created_at";

const PAYMENT_COLUMNS: &str = "id, order_id, method, amount_cents, status, tendered_cents, \
     change_cents, paid_at, created_at";

// =============================================================================
// Read Models
// =============================================================================

/// Rows written by one successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedCheckout {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: Payment,
}

/// Order with everything attached to it (admin detail view).
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

/// Order list row: the order plus its total unit count.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub item_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let recorded = db.orders().record_checkout(&draft).await?;
/// let order = db.orders().update_status(&recorded.order.id, OrderStatus::Preparing).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Writes order, items and payment as one unit.
    ///
    /// ## Errors
    /// - `PartialWrite { stage: Items | Payment, rolled_back }` when a write
    ///   fails after the order row; with `rolled_back = true` no row of this
    ///   checkout exists
    /// - `PartialWrite { stage: Commit, .. }` when COMMIT itself fails
    /// - the mapped sqlx error when the order row is rejected (for example
    ///   an unknown table id)
    pub async fn record_checkout(&self, draft: &OrderDraft) -> DbResult<RecordedCheckout> {
        let now = Utc::now();
        let plan = &draft.plan;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Step 5: order row
        let order_number = match allocate_order_number(&mut tx, now).await {
            Ok(number) => number,
            Err(e) => return Err(abort(tx, CheckoutStage::Order, e).await),
        };

        let (table_id, table_number) = match &draft.table {
            Some(binding) => (binding.table_id.clone(), Some(binding.table_number.clone())),
            None => (None, None),
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number,
            order_type: draft.order_type(),
            channel: draft.channel,
            table_id,
            table_number,
            staff_id: draft.staff_id.clone(),
            subtotal_cents: plan.totals.subtotal().cents(),
            tax_cents: plan.totals.tax().cents(),
            discount_cents: plan.totals.discount().cents(),
            total_cents: plan.totals.total().cents(),
            status: draft.initial_status,
            notes: draft.notes.clone(),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = insert_order(&mut tx, &order).await {
            return Err(abort(tx, CheckoutStage::Order, e).await);
        }

        // Step 6: item rows, prices frozen from the cart
        let mut items = Vec::with_capacity(plan.items.len());
        for planned in &plan.items {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                product_id: Some(planned.product_id.clone()),
                product_name: planned.product_name.clone(),
                unit_price_cents: planned.unit_price.cents(),
                quantity: planned.quantity,
                subtotal_cents: planned.subtotal.cents(),
                add_ons: planned.add_ons.clone(),
                variant_details: planned.variant_details.clone(),
                created_at: now,
            };

            if let Err(e) = insert_item(&mut tx, &item).await {
                return Err(abort(tx, CheckoutStage::Items, e).await);
            }
            items.push(item);
        }

        // Step 7: payment row
        let cash = plan.method.is_cash();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            method: plan.method,
            amount_cents: plan.totals.total().cents(),
            status: PaymentStatus::Paid,
            tendered_cents: if cash { plan.tendered.map(|t| t.cents()) } else { None },
            change_cents: if cash { Some(plan.change.cents()) } else { None },
            paid_at: Some(now),
            created_at: now,
        };

        if let Err(e) = insert_payment(&mut tx, &payment).await {
            return Err(abort(tx, CheckoutStage::Payment, e).await);
        }

        if let Err(e) = tx.commit().await {
            error!(order_number = %order.order_number, error = %e, "Checkout commit failed");
            return Err(commit_failed(e));
        }

        info!(
            order_number = %order.order_number,
            total = order.total_cents,
            items = items.len(),
            method = plan.method.as_str(),
            "Checkout recorded"
        );

        Ok(RecordedCheckout {
            order,
            items,
            payment,
        })
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Items of an order in the order they were written.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY rowid");
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_payments(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = ?1 ORDER BY rowid");
        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }

    /// Order plus items and payments.
    ///
    /// ## Errors
    /// `NotFound` when the order does not exist.
    pub async fn get_detail(&self, id: &str) -> DbResult<OrderDetail> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        let items = self.get_items(id).await?;
        let payments = self.get_payments(id).await?;

        Ok(OrderDetail {
            order,
            items,
            payments,
        })
    }

    /// Newest orders first, each with its unit count.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<OrderSummary>> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS},
                   (SELECT COALESCE(SUM(i.quantity), 0)
                    FROM order_items i WHERE i.order_id = orders.id) AS item_count
            FROM orders
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#
        );
        let orders = sqlx::query_as::<_, OrderSummary>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = orders.len(), limit, "Listed recent orders");
        Ok(orders)
    }

    /// Orders created inside the window, oldest first.
    pub async fn list_in_window(&self, window: &SalesWindow) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE created_at BETWEEN ?1 AND ?2 ORDER BY created_at"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        // Text timestamps compare lexically; the window check is authoritative
        Ok(orders
            .into_iter()
            .filter(|o| window.contains(o.created_at))
            .collect())
    }

    /// Items of orders in the window with the given status.
    pub async fn items_in_window(&self, window: &SalesWindow, status: OrderStatus) -> DbResult<Vec<OrderItem>> {
        let sql = r#"
            SELECT i.id, i.order_id, i.product_id, i.product_name, i.unit_price_cents,
                   i.quantity, i.subtotal_cents, i.add_ons, i.variant_details, i.created_at,
                   o.created_at AS order_created_at
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE o.status = ?1 AND o.created_at BETWEEN ?2 AND ?3
            ORDER BY o.created_at, i.rowid
        "#;
        let rows = sqlx::query_as::<_, WindowItemRow>(sql)
            .bind(status)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter(|r| window.contains(r.order_created_at))
            .map(|r| r.item)
            .collect())
    }

    /// Number of orders currently in any of `statuses`.
    pub async fn count_by_status(&self, statuses: &[OrderStatus]) -> DbResult<i64> {
        if statuses.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM orders WHERE status IN (");
        let mut separated = qb.separated(", ");
        for status in statuses {
            separated.push_bind(*status);
        }
        separated.push_unseparated(")");

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    /// Moves an order to `to`.
    ///
    /// A same-state request on an open order returns it unchanged.
    ///
    /// ## Errors
    /// - `NotFound` when the order does not exist
    /// - `Domain(InvalidTransition)` when the state machine forbids the move
    /// - `StaleWrite` when another writer changed the order since it was read
    pub async fn update_status(&self, id: &str, to: OrderStatus) -> DbResult<Order> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        match validate_transition(current.status, to) {
            Ok(Transition::NoOp) => {
                debug!(order_id = %id, status = %to, "Status unchanged");
                return Ok(current);
            }
            Ok(Transition::Apply) => {}
            Err(e) => {
                warn!(order_id = %id, from = %current.status, to = %to, "Rejected status change");
                return Err(e.into());
            }
        }

        if !self
            .update_status_if(id, current.status, current.version, to)
            .await?
        {
            warn!(order_id = %id, version = current.version, "Stale status update");
            return Err(DbError::stale("Order", id));
        }

        info!(
            order_number = %current.order_number,
            from = %current.status,
            to = %to,
            "Order status changed"
        );

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Compare-and-set status write. Returns `false` when the row no longer
    /// has `expected_status` at `expected_version`.
    ///
    /// No transition check happens here; callers go through
    /// [`update_status`](Self::update_status).
    pub async fn update_status_if(
        &self,
        id: &str,
        expected_status: OrderStatus,
        expected_version: i64,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?1, version = version + 1, updated_at = ?2
            WHERE id = ?3 AND status = ?4 AND version = ?5
            "#,
        )
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(expected_status)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[derive(sqlx::FromRow)]
struct WindowItemRow {
    #[sqlx(flatten)]
    item: OrderItem,
    order_created_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Steps
// =============================================================================

/// Next `ORD-YYYYMMDD-NNNN` for the UTC day of `now`.
async fn allocate_order_number(
    tx: &mut Transaction<'_, Sqlite>,
    now: DateTime<Utc>,
) -> Result<String, sqlx::Error> {
    let day = now.format("%Y%m%d").to_string();

    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_counters (day, last_seq) VALUES (?1, 1)
        ON CONFLICT(day) DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(&day)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("{ORDER_NUMBER_PREFIX}-{day}-{seq:04}"))
}

async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, order_type, channel, table_id, table_number, staff_id,
            subtotal_cents, tax_cents, discount_cents, total_cents, status, notes,
            version, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
    )
    .bind(&order.id)
    .bind(&order.order_number)
    .bind(order.order_type)
    .bind(order.channel)
    .bind(&order.table_id)
    .bind(&order.table_number)
    .bind(&order.staff_id)
    .bind(order.subtotal_cents)
    .bind(order.tax_cents)
    .bind(order.discount_cents)
    .bind(order.total_cents)
    .bind(order.status)
    .bind(&order.notes)
    .bind(order.version)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_item(tx: &mut Transaction<'_, Sqlite>, item: &OrderItem) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, product_name, unit_price_cents, quantity,
            subtotal_cents, add_ons, variant_details, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.subtotal_cents)
    .bind(sqlx::types::Json(&item.add_ons))
    .bind(&item.variant_details)
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_payment(tx: &mut Transaction<'_, Sqlite>, payment: &Payment) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, order_id, method, amount_cents, status, tendered_cents,
            change_cents, paid_at, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.order_id)
    .bind(payment.method)
    .bind(payment.amount_cents)
    .bind(payment.status)
    .bind(payment.tendered_cents)
    .bind(payment.change_cents)
    .bind(payment.paid_at)
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Rolls back and maps the failure of `stage`.
///
/// A rejected order row has nothing written before it worth reporting, so
/// it surfaces as the plain constraint error. Later stages report
/// `PartialWrite` with the rollback outcome.
async fn abort(tx: Transaction<'_, Sqlite>, stage: CheckoutStage, cause: sqlx::Error) -> DbError {
    let rolled_back = match tx.rollback().await {
        Ok(()) => true,
        Err(e) => {
            error!(stage = %stage, error = %e, "Checkout rollback failed");
            false
        }
    };

    error!(stage = %stage, rolled_back, error = %cause, "Checkout aborted");

    match stage {
        CheckoutStage::Order if rolled_back => DbError::from(cause),
        _ => DbError::PartialWrite {
            stage,
            rolled_back,
            message: cause.to_string(),
        },
    }
}

/// Maps a failed COMMIT.
///
/// SQLite makes nothing durable when COMMIT fails, and sqlx rolls back the
/// dropped transaction before the connection is reused, so the checkout
/// left no rows behind.
fn commit_failed(cause: sqlx::Error) -> DbError {
    DbError::PartialWrite {
        stage: CheckoutStage::Commit,
        rolled_back: true,
        message: cause.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kopi_core::{
        plan_checkout, AddOnSnapshot, Cart, CoreError, Customization, Money, OrderChannel,
        OrderType, PaymentInput, PaymentMethod, Size, TableBinding, TaxRate, Temperature,
    };

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let latte = db
            .catalog()
            .insert_product("Caffè Latte", None, 450, "coffee", true, true)
            .await
            .unwrap();
        (db, latte.id)
    }

    fn oat_milk() -> AddOnSnapshot {
        AddOnSnapshot {
            id: "oat".to_string(),
            name: "Oat Milk".to_string(),
            price_cents: 75,
        }
    }

    fn draft_for(product_id: &str, payment: PaymentInput, table: Option<TableBinding>) -> OrderDraft {
        let mut cart = Cart::new();
        let custom = Customization {
            size: Some(Size::Medium),
            temperature: Some(Temperature::Iced),
            add_ons: vec![oat_milk()],
        };
        cart.add_line(product_id, "Caffè Latte", Money::from_cents(450), 2, custom)
            .unwrap();

        let plan = plan_checkout(cart.lines(), TaxRate::from_bps(1100), Money::zero(), payment).unwrap();
        OrderDraft {
            channel: OrderChannel::Pos,
            table,
            staff_id: Some("staff-1".to_string()),
            notes: None,
            initial_status: OrderStatus::Pending,
            plan,
        }
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_checkout_writes_all_rows() {
        let (db, latte) = setup().await;
        let draft = draft_for(&latte, PaymentInput::cash(Money::from_cents(1200)), None);

        let recorded = db.orders().record_checkout(&draft).await.unwrap();
        let order = &recorded.order;

        assert_eq!(order.subtotal_cents, 1050);
        assert_eq!(order.tax_cents, 116);
        assert_eq!(order.total_cents, 1166);
        assert_eq!(order.order_type, OrderType::Takeaway);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(recorded.payment.change_cents, Some(34));
        assert_eq!(recorded.payment.tendered_cents, Some(1200));

        let detail = db.orders().get_detail(&order.id).await.unwrap();
        assert_eq!(detail.order.order_number, order.order_number);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].unit_price_cents, 525);
        assert_eq!(detail.items[0].add_ons, vec![oat_milk()]);
        assert_eq!(
            detail.items[0].variant_details.as_deref(),
            Some("Medium, Iced, Oat Milk")
        );
        assert_eq!(detail.payments.len(), 1);
        assert_eq!(detail.payments[0].method, PaymentMethod::Cash);
        assert_eq!(detail.payments[0].status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential_per_day() {
        let (db, latte) = setup().await;
        let payment = PaymentInput::non_cash(PaymentMethod::Card);

        let first = db
            .orders()
            .record_checkout(&draft_for(&latte, payment, None))
            .await
            .unwrap();
        let second = db
            .orders()
            .record_checkout(&draft_for(&latte, payment, None))
            .await
            .unwrap();

        let day = first.order.created_at.format("%Y%m%d").to_string();
        assert_eq!(first.order.order_number, format!("ORD-{day}-0001"));
        assert!(second.order.order_number.ends_with("-0002"));
        assert_eq!(first.payment.tendered_cents, None);
        assert_eq!(first.payment.change_cents, None);
    }

    #[tokio::test]
    async fn test_failed_item_write_leaves_nothing() {
        let (db, _) = setup().await;
        let draft = draft_for("no-such-product", PaymentInput::non_cash(PaymentMethod::Card), None);

        let err = db.orders().record_checkout(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::PartialWrite {
                stage: CheckoutStage::Items,
                rolled_back: true,
                ..
            }
        ));

        assert_eq!(count(&db, "orders").await, 0);
        assert_eq!(count(&db, "order_items").await, 0);
        assert_eq!(count(&db, "payments").await, 0);
        // Counter allocation rolled back too
        assert_eq!(count(&db, "order_counters").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_table_rejects_order_row() {
        let (db, latte) = setup().await;
        let table = TableBinding {
            table_id: Some("ghost-table".to_string()),
            table_number: "99".to_string(),
        };
        let draft = draft_for(&latte, PaymentInput::non_cash(PaymentMethod::Card), Some(table));

        let err = db.orders().record_checkout(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(count(&db, "orders").await, 0);
    }

    #[tokio::test]
    async fn test_status_walks_forward_and_bumps_version() {
        let (db, latte) = setup().await;
        let orders = db.orders();
        let recorded = orders
            .record_checkout(&draft_for(&latte, PaymentInput::non_cash(PaymentMethod::Card), None))
            .await
            .unwrap();
        let id = recorded.order.id;

        let preparing = orders.update_status(&id, OrderStatus::Preparing).await.unwrap();
        assert_eq!(preparing.status, OrderStatus::Preparing);
        assert_eq!(preparing.version, 2);

        // Same state is a no-op
        let again = orders.update_status(&id, OrderStatus::Preparing).await.unwrap();
        assert_eq!(again.version, 2);

        orders.update_status(&id, OrderStatus::Ready).await.unwrap();
        let done = orders.update_status(&id, OrderStatus::Completed).await.unwrap();
        assert_eq!(done.version, 4);

        let err = orders.update_status(&id, OrderStatus::Cancelled).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Cancelled
            })
        ));
    }

    #[tokio::test]
    async fn test_stale_version_loses() {
        let (db, latte) = setup().await;
        let orders = db.orders();
        let recorded = orders
            .record_checkout(&draft_for(&latte, PaymentInput::non_cash(PaymentMethod::Card), None))
            .await
            .unwrap();
        let id = recorded.order.id;

        // Another session moves the order first
        assert!(orders
            .update_status_if(&id, OrderStatus::Pending, 1, OrderStatus::Preparing)
            .await
            .unwrap());

        // A writer still holding version 1 is rejected
        assert!(!orders
            .update_status_if(&id, OrderStatus::Pending, 1, OrderStatus::Cancelled)
            .await
            .unwrap());

        let order = orders.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let (db, _) = setup().await;
        let err = db
            .orders()
            .update_status("missing", OrderStatus::Ready)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_recent_and_counts() {
        let (db, latte) = setup().await;
        let orders = db.orders();
        let payment = PaymentInput::non_cash(PaymentMethod::DigitalWallet);

        let first = orders.record_checkout(&draft_for(&latte, payment, None)).await.unwrap();
        let second = orders.record_checkout(&draft_for(&latte, payment, None)).await.unwrap();
        orders
            .update_status(&first.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let recent = orders.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order.id, second.order.id);
        assert_eq!(recent[0].item_count, 2);

        assert_eq!(orders.list_recent(1).await.unwrap().len(), 1);
        assert_eq!(
            orders
                .count_by_status(&[OrderStatus::Pending, OrderStatus::Preparing])
                .await
                .unwrap(),
            1
        );
        assert_eq!(orders.count_by_status(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_window_reads_filter_by_status() {
        let (db, latte) = setup().await;
        let orders = db.orders();
        let payment = PaymentInput::non_cash(PaymentMethod::Card);

        let kept = orders.record_checkout(&draft_for(&latte, payment, None)).await.unwrap();
        orders.record_checkout(&draft_for(&latte, payment, None)).await.unwrap();
        for to in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
            orders.update_status(&kept.order.id, to).await.unwrap();
        }

        let window = SalesWindow::for_day(kept.order.created_at.date_naive());
        assert_eq!(orders.list_in_window(&window).await.unwrap().len(), 2);

        let items = orders
            .items_in_window(&window, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, kept.order.id);
    }

    #[tokio::test]
    async fn test_deleting_table_keeps_order() {
        let (db, latte) = setup().await;
        let table = db
            .tables()
            .create("4", 4, "http://localhost:8080/pos?table=4")
            .await
            .unwrap();
        let binding = TableBinding::from(&table);

        let recorded = db
            .orders()
            .record_checkout(&draft_for(
                &latte,
                PaymentInput::non_cash(PaymentMethod::Card),
                Some(binding),
            ))
            .await
            .unwrap();
        assert_eq!(recorded.order.order_type, OrderType::DineIn);

        assert!(db.tables().delete(&table.id).await.unwrap());

        let order = db.orders().get_by_id(&recorded.order.id).await.unwrap().unwrap();
        assert_eq!(order.table_id, None);
        assert_eq!(order.table_number.as_deref(), Some("4"));
    }

    #[test]
    fn test_commit_failure_reports_rollback() {
        match commit_failed(sqlx::Error::PoolTimedOut) {
            DbError::PartialWrite {
                stage,
                rolled_back,
                ..
            } => {
                assert_eq!(stage, CheckoutStage::Commit);
                assert!(rolled_back);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
