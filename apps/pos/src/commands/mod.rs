//! # Commands
//!
//! Functions the front end invokes. Each takes the shared
//! [`PosContext`](crate::PosContext), plus a [`Session`](crate::Session)
//! when it touches a cart, and returns [`PosResult`](crate::PosResult).
//!
//! | Module       | Screen                         |
//! |--------------|--------------------------------|
//! | [`cart`]     | Menu / POS product grid        |
//! | [`checkout`] | Payment dialog, receipt        |
//! | [`orders`]   | Admin order management         |
//! | [`reports`]  | Admin dashboard, sales reports |
//! | [`tables`]   | Admin tables, QR scan          |

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod reports;
pub mod tables;
