//! # Checkout Commands
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session cart ──► plan_checkout (empty? tendered ≥ total?)             │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  OrderDraft ──► record_checkout ─── BEGIN                              │
//! │                                      order row                          │
//! │                                      item rows                          │
//! │                                      payment row                        │
//! │                                     COMMIT ──► ReceiptSnapshot          │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                     charged lines removed from cart    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure before COMMIT leaves the cart as it was so the cashier can
//! retry or change the payment.

use serde::Deserialize;
use tracing::{debug, error, info};

use kopi_core::validation::validate_notes;
use kopi_core::{
    plan_checkout, CartLine, Money, OrderChannel, OrderDraft, OrderStatus, PaymentInput,
    ReceiptSnapshot, TaxRate,
};
use kopi_db::{DbError, RecordedCheckout};

use crate::error::{PosError, PosResult};
use crate::state::Session;
use crate::PosContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment: PaymentInput,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    pub fn new(payment: PaymentInput) -> Self {
        CheckoutRequest {
            payment,
            discount: Money::zero(),
            notes: None,
        }
    }
}

/// Converts the session's cart into a paid order and returns its receipt.
///
/// ## Errors
/// - `EmptyCart`, `InsufficientPayment`, `InvalidDiscount`: nothing written
/// - `PartialCheckout`: a write after the order row failed
/// - `Persistence`: the order row itself was rejected
///
/// In every error case the cart is unchanged. On success only the lines
/// that were charged leave the cart.
pub async fn checkout(
    ctx: &PosContext,
    session: &Session,
    request: CheckoutRequest,
) -> PosResult<ReceiptSnapshot> {
    let channel = session.channel();
    let tax_rate = ctx.tax_rate(channel);
    let lines = session.cart().with_cart(|cart| cart.lines().to_vec());

    debug!(
        session_id = %session.id(),
        lines = lines.len(),
        method = request.payment.method.as_str(),
        "checkout"
    );

    let plan = plan_checkout(&lines, tax_rate, request.discount, request.payment)?;
    let notes = validate_notes(request.notes.as_deref())?;

    let initial_status = if ctx.config.pos.complete_on_payment && channel == OrderChannel::Pos {
        OrderStatus::Completed
    } else {
        OrderStatus::Pending
    };

    let draft = OrderDraft {
        channel,
        table: session.table().cloned(),
        staff_id: session.staff_id().map(str::to_string),
        notes,
        initial_status,
        plan,
    };

    let recorded = match ctx.db.orders().record_checkout(&draft).await {
        Ok(recorded) => recorded,
        Err(e) => {
            let err = PosError::from(e);
            if let PosError::PartialCheckout { stage, rolled_back, .. } = &err {
                error!(
                    session_id = %session.id(),
                    stage = %stage,
                    rolled_back = *rolled_back,
                    "Checkout failed, cart kept"
                );
            }
            return Err(err);
        }
    };

    Ok(settle_checkout(ctx, session, &lines, &recorded, tax_rate))
}

/// Builds the receipt for a committed checkout and takes the charged lines
/// out of the cart. Anything added to the cart while the order was being
/// written stays for the next checkout.
fn settle_checkout(
    ctx: &PosContext,
    session: &Session,
    charged: &[CartLine],
    recorded: &RecordedCheckout,
    tax_rate: TaxRate,
) -> ReceiptSnapshot {
    let receipt = ReceiptSnapshot::build(
        &ctx.config.store_header(),
        &recorded.order,
        &recorded.items,
        &recorded.payment,
        tax_rate,
    );

    let remaining = session.cart().with_cart_mut(|cart| {
        cart.settle(charged);
        cart.line_count()
    });

    info!(
        session_id = %session.id(),
        order_number = %receipt.order_number,
        total = receipt.total.cents(),
        remaining_lines = remaining,
        "Checkout complete"
    );

    receipt
}

/// Text layout at the configured printer width.
pub fn render_receipt(ctx: &PosContext, receipt: &ReceiptSnapshot) -> String {
    receipt.render_text(ctx.config.pos.receipt_width)
}

/// Rebuilds the receipt of a past order from its stored rows.
///
/// The tax rate label uses the order channel's current rate; the amounts
/// are the stored ones.
pub async fn reprint_receipt(ctx: &PosContext, order_id: &str) -> PosResult<ReceiptSnapshot> {
    let detail = ctx.db.orders().get_detail(order_id).await?;
    let payment = detail
        .payments
        .last()
        .ok_or_else(|| DbError::not_found("Payment", order_id))?;

    Ok(ReceiptSnapshot::build(
        &ctx.config.store_header(),
        &detail.order,
        &detail.items,
        payment,
        ctx.tax_rate(detail.order.channel),
    ))
}
