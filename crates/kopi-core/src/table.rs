//! # Table QR Payloads
//!
//! A dine-in table carries a QR code that routes a customer session into
//! the ordering flow pre-bound to that table:
//!
//! ```text
//! {origin}/pos?table={table_number}
//! http://localhost:8080/pos?table=7
//! ```
//!
//! Rendering the QR image is the front end's job; this module only builds
//! and parses the payload string.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::types::DiningTable;
use crate::validation::validate_table_number;

const QR_PATH: &str = "/pos";
const QR_PARAM: &str = "table";

/// A session's binding to a table, copied onto the order at checkout.
///
/// `table_id` is `None` when only the number is known (for example a QR
/// payload scanned for a table that was since deleted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableBinding {
    pub table_id: Option<String>,
    pub table_number: String,
}

impl From<&DiningTable> for TableBinding {
    fn from(table: &DiningTable) -> Self {
        TableBinding {
            table_id: Some(table.id.clone()),
            table_number: table.table_number.clone(),
        }
    }
}

/// Builds the QR payload for a table.
///
/// A trailing `/` on the origin is trimmed and the table number is
/// URL-encoded.
///
/// ```rust
/// use kopi_core::table::qr_payload;
///
/// assert_eq!(qr_payload("http://localhost:8080/", "7"), "http://localhost:8080/pos?table=7");
/// ```
pub fn qr_payload(origin: &str, table_number: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(QR_PARAM, table_number)
        .finish();
    format!("{}{}?{}", origin.trim_end_matches('/'), QR_PATH, query)
}

/// Extracts the table number from a scanned payload.
///
/// ## Errors
/// `InvalidTablePayload` when the string is not a URL, the path is not
/// `/pos`, or the `table` parameter is missing or not a valid number.
pub fn parse_qr_payload(payload: &str) -> CoreResult<String> {
    let url = Url::parse(payload.trim())
        .map_err(|e| CoreError::InvalidTablePayload(format!("{}: {}", payload, e)))?;

    if url.path().trim_end_matches('/') != QR_PATH {
        return Err(CoreError::InvalidTablePayload(format!(
            "unexpected path {}",
            url.path()
        )));
    }

    let number = url
        .query_pairs()
        .find(|(k, _)| k == QR_PARAM)
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| CoreError::InvalidTablePayload(format!("missing {} parameter", QR_PARAM)))?;

    validate_table_number(&number).map_err(|e| CoreError::InvalidTablePayload(e.to_string()))
}
