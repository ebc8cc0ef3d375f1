//! # Cart State
//!
//! Holds one session's cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because commands for the same
//! session may run concurrently and only one may modify the cart at a time.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Frontend Action          Command                 Cart State Change     │
//! │  ───────────────          ───────                 ─────────────────     │
//! │                                                                         │
//! │  Tap Product ────────────► add_to_cart() ────────► add_item / merge    │
//! │                                                                         │
//! │  +/- Buttons ────────────► adjust_cart_line() ───► quantity ± 1        │
//! │                                                                         │
//! │  Click Remove ───────────► remove_cart_line() ───► line removed        │
//! │                                                                         │
//! │  Pay ────────────────────► checkout() ───────────► clear after commit  │
//! │                                                                         │
//! │  View Cart ──────────────► view_cart() ──────────► (read only)         │
//! │                                                                         │
//! │  NOTE: The lock is never held across an await.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use kopi_core::Cart;

/// Session-owned cart.
///
/// Cloning shares the same cart.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let lines = cart_state.with_cart(|cart| cart.lines().to_vec());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // A panic while holding the lock leaves a structurally valid cart
        let cart = self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product, 1, customization))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut cart)
    }

    /// Copy of the cart for responses.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
