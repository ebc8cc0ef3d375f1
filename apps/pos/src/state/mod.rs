//! # State Module
//!
//! Per-session state. The database handle and configuration live on
//! [`PosContext`](crate::PosContext) and are shared by all sessions.

pub mod cart;
pub mod session;

pub use cart::CartState;
pub use session::{Session, SessionInfo};
