//! # Cart Commands
//!
//! Product and add-on prices are read from the catalog when a line is
//! added and frozen into the line.

use serde::{Deserialize, Serialize};
use tracing::debug;

use kopi_core::validation::validate_add_on_ids;
use kopi_core::{AddOn, CartEstimate, CartLine, Customization, Size, Temperature};
use kopi_db::DbError;

use crate::error::PosResult;
use crate::state::Session;
use crate::PosContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub temperature: Option<Temperature>,
    #[serde(default)]
    pub add_on_ids: Vec<String>,
}

/// Cart lines plus totals at the session channel's tax rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub estimate: CartEstimate,
}

pub fn view_cart(ctx: &PosContext, session: &Session) -> CartView {
    let rate = ctx.tax_rate(session.channel());
    session.cart().with_cart(|cart| CartView {
        lines: cart.lines().to_vec(),
        estimate: CartEstimate::from_cart(cart, rate),
    })
}

/// Adds a catalog product with its customization, merging into an
/// identical line.
///
/// ## Errors
/// - `Validation` when an add-on id is repeated
/// - `NotFound` for an unknown or inactive product or add-on
/// - `QuantityTooLarge` / `CartTooLarge` / `Validation` from the cart
pub async fn add_to_cart(
    ctx: &PosContext,
    session: &Session,
    request: AddToCartRequest,
) -> PosResult<CartView> {
    debug!(product_id = %request.product_id, quantity = request.quantity, "add_to_cart");
    validate_add_on_ids(&request.add_on_ids)?;

    let product = ctx
        .db
        .catalog()
        .get_product(&request.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| DbError::not_found("Product", request.product_id.as_str()))?;

    let add_ons = ctx
        .db
        .catalog()
        .get_add_ons(&request.add_on_ids)
        .await?
        .iter()
        .map(AddOn::snapshot)
        .collect();

    let customization = Customization {
        size: request.size,
        temperature: request.temperature,
        add_ons,
    };

    session
        .cart()
        .with_cart_mut(|cart| cart.add_item(&product, request.quantity, customization))?;

    Ok(view_cart(ctx, session))
}

/// Sets a line's quantity; zero or less removes it.
pub fn update_cart_line(
    ctx: &PosContext,
    session: &Session,
    line_id: &str,
    quantity: i64,
) -> PosResult<CartView> {
    session
        .cart()
        .with_cart_mut(|cart| cart.update_quantity(line_id, quantity))?;
    Ok(view_cart(ctx, session))
}

/// POS +/- buttons.
pub fn adjust_cart_line(
    ctx: &PosContext,
    session: &Session,
    line_id: &str,
    delta: i64,
) -> PosResult<CartView> {
    session
        .cart()
        .with_cart_mut(|cart| cart.adjust_quantity(line_id, delta))?;
    Ok(view_cart(ctx, session))
}

pub fn remove_cart_line(ctx: &PosContext, session: &Session, line_id: &str) -> CartView {
    session.cart().with_cart_mut(|cart| cart.remove_item(line_id));
    view_cart(ctx, session)
}

pub fn clear_cart(ctx: &PosContext, session: &Session) -> CartView {
    session.cart().clear();
    view_cart(ctx, session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::fixture;
    use crate::error::PosError;
    use kopi_core::{CoreError, OrderChannel};

    fn request(product_id: &str, quantity: i64, add_on_ids: Vec<String>) -> AddToCartRequest {
        AddToCartRequest {
            product_id: product_id.to_string(),
            quantity,
            size: Some(Size::Medium),
            temperature: Some(Temperature::Hot),
            add_on_ids,
        }
    }

    #[tokio::test]
    async fn test_add_prices_from_catalog_and_merges() {
        let f = fixture().await;
        let session = Session::new(OrderChannel::Pos);

        add_to_cart(&f.ctx, &session, request(&f.latte.id, 1, vec![f.oat_milk.id.clone()]))
            .await
            .unwrap();
        let view = add_to_cart(&f.ctx, &session, request(&f.latte.id, 1, vec![f.oat_milk.id.clone()]))
            .await
            .unwrap();

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].unit_price.cents(), 525);
        assert_eq!(view.lines[0].label, "Medium, Hot, Oat Milk");
        assert_eq!(view.estimate.subtotal.cents(), 1050);
        assert_eq!(view.estimate.tax.cents(), 116);

        // Different customization is a separate line
        let view = add_to_cart(&f.ctx, &session, request(&f.latte.id, 1, vec![]))
            .await
            .unwrap();
        assert_eq!(view.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_customer_estimate_uses_customer_rate() {
        let f = fixture().await;
        let session = Session::new(OrderChannel::Customer);

        let view = add_to_cart(&f.ctx, &session, request(&f.croissant.id, 1, vec![]))
            .await
            .unwrap();
        assert_eq!(view.estimate.tax_rate.bps(), 800);
        assert_eq!(view.estimate.tax.cents(), 24);
    }

    #[tokio::test]
    async fn test_catalog_price_change_does_not_reach_cart() {
        let f = fixture().await;
        let session = Session::new(OrderChannel::Pos);

        add_to_cart(&f.ctx, &session, request(&f.croissant.id, 1, vec![]))
            .await
            .unwrap();
        sqlx_update_price(&f.ctx, &f.croissant.id, 999).await;

        let view = view_cart(&f.ctx, &session);
        assert_eq!(view.lines[0].unit_price.cents(), 300);
    }

    async fn sqlx_update_price(ctx: &PosContext, id: &str, cents: i64) {
        sqlx::query("UPDATE products SET price_cents = ?1 WHERE id = ?2")
            .bind(cents)
            .bind(id)
            .execute(ctx.db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_product_and_add_on() {
        let f = fixture().await;
        let session = Session::new(OrderChannel::Pos);

        let err = add_to_cart(&f.ctx, &session, request("nope", 1, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Persistence(DbError::NotFound { .. })));

        let err = add_to_cart(&f.ctx, &session, request(&f.latte.id, 1, vec!["nope".to_string()]))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Persistence(DbError::NotFound { .. })));
        assert!(session.cart().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_add_on_rejected() {
        let f = fixture().await;
        let session = Session::new(OrderChannel::Pos);
        let oat = f.oat_milk.id.clone();

        let err = add_to_cart(&f.ctx, &session, request(&f.latte.id, 1, vec![oat.clone(), oat.clone()]))
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::Validation(_))));
        assert!(session.cart().snapshot().is_empty());

        let view = add_to_cart(&f.ctx, &session, request(&f.latte.id, 1, vec![oat]))
            .await
            .unwrap();
        assert_eq!(view.lines[0].unit_price.cents(), 525);
        assert_eq!(view.lines[0].label, "Medium, Hot, Oat Milk");
    }

    #[tokio::test]
    async fn test_line_edits() {
        let f = fixture().await;
        let session = Session::new(OrderChannel::Pos);

        let view = add_to_cart(&f.ctx, &session, request(&f.croissant.id, 2, vec![]))
            .await
            .unwrap();
        let line_id = view.lines[0].line_id.clone();

        let view = adjust_cart_line(&f.ctx, &session, &line_id, 1).unwrap();
        assert_eq!(view.lines[0].quantity, 3);

        let view = update_cart_line(&f.ctx, &session, &line_id, 1).unwrap();
        assert_eq!(view.lines[0].quantity, 1);

        let view = adjust_cart_line(&f.ctx, &session, &line_id, -1).unwrap();
        assert!(view.lines.is_empty());

        let err = adjust_cart_line(&f.ctx, &session, &line_id, 1).unwrap_err();
        assert!(matches!(err, PosError::Core(CoreError::LineNotFound(_))));

        // Removing an absent line is not an error
        assert!(remove_cart_line(&f.ctx, &session, &line_id).lines.is_empty());
        assert_eq!(clear_cart(&f.ctx, &session).estimate.item_count, 0);
    }
}
