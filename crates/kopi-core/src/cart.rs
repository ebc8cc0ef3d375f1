//! # Cart Store
//!
//! The session-scoped collection of cart lines. Used by both the customer
//! cart and the POS cart (two instances, one contract).
//!
//! ## Line Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add(Latte, Large+Oat)  ──► line A  qty 1                               │
//! │  add(Latte, Large+Oat)  ──► line A  qty 2   same product + signature    │
//! │  add(Latte, Hot)        ──► line B  qty 1   different signature         │
//! │                                                                         │
//! │  update_quantity(A, 0)  ──► remove(A)       never a zero-quantity line  │
//! │  remove(X)              ──► no-op           idempotent                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are keyed by a UUID line id, not by product id. Totals are always
//! derived from the current lines; nothing is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;
use crate::types::{Customization, Product};
use crate::validation::{validate_add_on_ids, validate_quantity};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// One distinct product + customization combination.
///
/// ## Price Freezing
/// `unit_price` is resolved when the line is created. If the catalog price
/// changes afterwards, this line keeps the original price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub line_id: String,
    pub product_id: String,
    pub product_name: String,
    /// Base price plus add-on deltas, fixed at creation.
    pub unit_price: Money,
    pub quantity: i64,
    pub customization: Customization,
    /// Display-only, derived from `customization`.
    pub label: String,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        pricing::line_total(self.unit_price, self.quantity)
    }

    fn matches(&self, product_id: &str, signature: &str) -> bool {
        self.product_id == product_id && self.customization.signature() == signature
    }
}

/// The cart.
///
/// ## Invariants
/// - Every line has `1 <= quantity <= 999`
/// - At most 100 distinct lines
/// - No two lines share product id and customization signature
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a catalog product. See [`Cart::add_line`].
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        customization: Customization,
    ) -> CoreResult<String> {
        self.add_line(
            &product.id,
            &product.name,
            product.price(),
            quantity,
            customization,
        )
    }

    /// Adds `quantity` of a product, merging into an identical line.
    ///
    /// ## Behavior
    /// - Same product id and customization signature: quantity increments
    /// - Otherwise: new line with a fresh line id
    ///
    /// ## Returns
    /// The line id that now holds the quantity.
    pub fn add_line(
        &mut self,
        product_id: &str,
        product_name: &str,
        base_price: Money,
        quantity: i64,
        customization: Customization,
    ) -> CoreResult<String> {
        validate_quantity(quantity)?;
        let add_on_ids: Vec<&str> = customization.add_ons.iter().map(|a| a.id.as_str()).collect();
        validate_add_on_ids(&add_on_ids)?;

        let signature = customization.signature();
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(product_id, &signature))
        {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(line.line_id.clone());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let line = CartLine {
            line_id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            unit_price: pricing::unit_price(base_price, &customization.add_ons),
            quantity,
            label: customization.label(),
            customization,
            added_at: Utc::now(),
        };
        let line_id = line.line_id.clone();
        self.lines.push(line);
        Ok(line_id)
    }

    /// Sets a line's quantity.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_item`]
    /// - Unknown line id with a positive quantity: `LineNotFound`
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(line_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// POS +/- buttons. A result at or below zero removes the line.
    pub fn adjust_quantity(&mut self, line_id: &str, delta: i64) -> CoreResult<()> {
        let current = self
            .line(line_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        self.update_quantity(line_id, current + delta)
    }

    /// Removes a line. Returns whether anything was removed; an unknown id
    /// is not an error.
    pub fn remove_item(&mut self, line_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);
        self.lines.len() != before
    }

    /// Takes charged lines out of the cart after a checkout.
    ///
    /// Only the charged quantity of each charged line id is removed. Lines
    /// added, or units merged into a line, after `charged` was copied stay
    /// in the cart. Empties the cart the usual way once nothing is left.
    pub fn settle(&mut self, charged: &[CartLine]) {
        for paid in charged {
            if let Some(line) = self.lines.iter_mut().find(|l| l.line_id == paid.line_id) {
                line.quantity -= paid.quantity;
            }
        }
        self.lines.retain(|l| l.quantity > 0);

        if self.lines.is_empty() {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals.
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddOnSnapshot, Size, Temperature};

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            price_cents,
            category: "espresso".to_string(),
            is_featured: false,
            is_popular: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn oat_milk() -> AddOnSnapshot {
        AddOnSnapshot {
            id: "oat".to_string(),
            name: "Oat Milk".to_string(),
            price_cents: 75,
        }
    }

    fn vanilla() -> AddOnSnapshot {
        AddOnSnapshot {
            id: "vanilla".to_string(),
            name: "Vanilla Syrup".to_string(),
            price_cents: 50,
        }
    }

    fn assert_totals_consistent(cart: &Cart) {
        let expected: i64 = cart
            .lines()
            .iter()
            .map(|l| l.unit_price.cents() * l.quantity)
            .sum();
        assert_eq!(cart.total_price().cents(), expected);
        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
    }

    #[test]
    fn test_add_item_resolves_unit_price() {
        let mut cart = Cart::new();
        let latte = test_product("latte", 450);
        let custom = Customization {
            size: Some(Size::Large),
            temperature: Some(Temperature::Iced),
            add_ons: vec![oat_milk()],
        };

        let id = cart.add_item(&latte, 2, custom).unwrap();
        let line = cart.line(&id).unwrap();

        assert_eq!(line.unit_price.cents(), 525);
        assert_eq!(line.label, "Large, Iced, Oat Milk");
        assert_eq!(cart.total_price().cents(), 1050);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_identical_additions_merge() {
        let mut cart = Cart::new();
        let latte = test_product("latte", 450);
        let custom = Customization {
            add_ons: vec![oat_milk(), vanilla()],
            ..Default::default()
        };
        let reordered = Customization {
            add_ons: vec![vanilla(), oat_milk()],
            ..Default::default()
        };

        let a = cart.add_item(&latte, 1, custom).unwrap();
        let b = cart.add_item(&latte, 1, reordered).unwrap();

        assert_eq!(a, b);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_different_customizations_do_not_merge() {
        let mut cart = Cart::new();
        let latte = test_product("latte", 450);

        cart.add_item(&latte, 1, Customization::default()).unwrap();
        cart.add_item(
            &latte,
            1,
            Customization {
                add_ons: vec![oat_milk()],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_price().cents(), 450 + 525);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(&test_product("a", 300), 3, Customization::default())
            .unwrap();

        cart.update_quantity(&id, 0).unwrap();
        assert!(cart.is_empty());

        // Removing an absent line through update is still fine
        cart.update_quantity(&id, -1).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_line() {
        let mut cart = Cart::new();
        let err = cart.update_quantity("missing", 2).unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound(_)));
    }

    #[test]
    fn test_adjust_quantity_routes_to_remove() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(&test_product("a", 300), 1, Customization::default())
            .unwrap();

        cart.adjust_quantity(&id, 2).unwrap();
        assert_eq!(cart.line(&id).unwrap().quantity, 3);

        cart.adjust_quantity(&id, -3).unwrap();
        assert!(cart.line(&id).is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(&test_product("a", 300), 1, Customization::default())
            .unwrap();

        assert!(cart.remove_item(&id));
        assert!(!cart.remove_item(&id));
        assert!(!cart.remove_item("never-existed"));
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        let product = test_product("a", 100);

        assert!(matches!(
            cart.add_item(&product, 0, Customization::default()),
            Err(CoreError::Validation(_))
        ));

        let id = cart.add_item(&product, 999, Customization::default()).unwrap();
        assert!(matches!(
            cart.add_item(&product, 1, Customization::default()),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
        assert!(matches!(
            cart.update_quantity(&id, 1000),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(cart.line(&id).unwrap().quantity, 999);
    }

    #[test]
    fn test_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            cart.add_item(&test_product(&i.to_string(), 100), 1, Customization::default())
                .unwrap();
        }
        let err = cart
            .add_item(&test_product("one-too-many", 100), 1, Customization::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: 100 }));
    }

    #[test]
    fn test_totals_after_mixed_operations() {
        let mut cart = Cart::new();
        let a = cart
            .add_item(&test_product("a", 450), 2, Customization::default())
            .unwrap();
        let b = cart
            .add_item(
                &test_product("b", 375),
                1,
                Customization {
                    add_ons: vec![vanilla()],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_totals_consistent(&cart);

        cart.update_quantity(&a, 5).unwrap();
        assert_totals_consistent(&cart);

        cart.adjust_quantity(&b, -1).unwrap();
        assert_totals_consistent(&cart);
        assert_eq!(cart.total_price().cents(), 2250);

        cart.clear();
        assert_totals_consistent(&cart);
        assert_eq!(cart.total_price(), Money::zero());
    }

    #[test]
    fn test_price_frozen_at_line_creation() {
        let mut cart = Cart::new();
        let mut product = test_product("a", 300);
        let id = cart.add_item(&product, 1, Customization::default()).unwrap();

        product.price_cents = 900;
        cart.add_item(&product, 1, Customization::default()).unwrap();

        // Merged into the original line at the original price
        assert_eq!(cart.line(&id).unwrap().unit_price.cents(), 300);
        assert_eq!(cart.total_price().cents(), 600);
    }

    #[test]
    fn test_duplicate_add_on_rejected() {
        let mut cart = Cart::new();
        let customization = Customization {
            size: Some(Size::Medium),
            temperature: None,
            add_ons: vec![oat_milk(), oat_milk()],
        };

        let err = cart
            .add_item(&test_product("latte", 450), 1, customization)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_settle_keeps_uncharged_units() {
        let mut cart = Cart::new();
        let latte = test_product("latte", 450);
        let scone = test_product("scone", 300);
        let latte_line = cart.add_item(&latte, 2, Customization::default()).unwrap();
        let charged = cart.lines().to_vec();

        // Edits made while the order was being written
        cart.add_item(&latte, 1, Customization::default()).unwrap();
        let scone_line = cart.add_item(&scone, 1, Customization::default()).unwrap();

        cart.settle(&charged);

        assert_eq!(cart.line(&latte_line).unwrap().quantity, 1);
        assert_eq!(cart.line(&scone_line).unwrap().quantity, 1);
        assert_totals_consistent(&cart);

        let rest = cart.lines().to_vec();
        cart.settle(&rest);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_settle_after_line_removed() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(&test_product("a", 300), 3, Customization::default())
            .unwrap();
        let charged = cart.lines().to_vec();

        cart.update_quantity(&id, 1).unwrap();
        cart.settle(&charged);
        assert!(cart.is_empty());
    }
}
