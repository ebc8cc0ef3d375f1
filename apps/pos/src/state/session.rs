//! # Session
//!
//! One ordering session: a POS terminal shift or one customer at the
//! self-ordering page. Sessions are created explicitly; nothing is global.
//!
//! ```text
//!   Session::new(channel)
//!        │
//!        ├── bind_table(...)      optional, dine-in
//!        ├── cart().with_cart_mut(...)
//!        ├── checkout(...)        clears the cart after commit
//!        │
//!   end()                          clears cart and table binding
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use kopi_core::{OrderChannel, TableBinding};

use super::cart::CartState;

#[derive(Debug)]
pub struct Session {
    id: String,
    channel: OrderChannel,
    table: Option<TableBinding>,
    staff_id: Option<String>,
    cart: CartState,
    started_at: DateTime<Utc>,
}

/// Read-only view of a session for responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub channel: OrderChannel,
    pub table: Option<TableBinding>,
    pub staff_id: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(channel: OrderChannel) -> Self {
        Session {
            id: Uuid::new_v4().to_string(),
            channel,
            table: None,
            staff_id: None,
            cart: CartState::new(),
            started_at: Utc::now(),
        }
    }

    /// POS session for a signed-in staff member.
    pub fn for_staff(staff_id: impl Into<String>) -> Self {
        let mut session = Session::new(OrderChannel::Pos);
        session.staff_id = Some(staff_id.into());
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn channel(&self) -> OrderChannel {
        self.channel
    }

    pub fn table(&self) -> Option<&TableBinding> {
        self.table.as_ref()
    }

    pub fn staff_id(&self) -> Option<&str> {
        self.staff_id.as_deref()
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Orders from this session become dine-in at `table`.
    pub fn bind_table(&mut self, table: TableBinding) {
        self.table = Some(table);
    }

    /// Back to takeaway.
    pub fn unbind_table(&mut self) {
        self.table = None;
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            channel: self.channel,
            table: self.table.clone(),
            staff_id: self.staff_id.clone(),
            started_at: self.started_at,
        }
    }

    /// Abandons the session: the cart is emptied and the table released.
    pub fn end(&mut self) {
        self.cart.clear();
        self.table = None;
    }
}
