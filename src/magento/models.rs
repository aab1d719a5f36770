use serde::{Deserialize, Serialize};

use crate::domain::{lenient, Order, StoreNote};

/// Envelope of the order search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderSearchResponse {
    #[serde(deserialize_with = "lenient::integer")]
    pub total_count: i64,
    pub items: Option<Vec<Order>>,
}

impl OrderSearchResponse {
    /// The returned orders. `total_count` is informational only; the item
    /// list is authoritative.
    pub fn into_orders(self) -> Vec<Order> {
        self.items.unwrap_or_default()
    }
}

/// Body of the store-note update call.
#[derive(Debug, Clone, Serialize)]
pub struct StoreNoteRequest<'a> {
    #[serde(rename = "storeNote")]
    pub store_note: &'a StoreNote,
}

/// Store note as persisted by the store, echoed by the update call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreNoteRecord {
    #[serde(deserialize_with = "lenient::integer")]
    pub sales_order_id: i64,
    #[serde(deserialize_with = "lenient::text")]
    pub sales_order_increment_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub note: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub erply_invoice_ids: String,
}

impl StoreNoteRecord {
    pub fn store_note(&self) -> StoreNote {
        StoreNote::new(
            self.status.clone(),
            self.note.clone(),
            self.erply_invoice_ids.clone(),
        )
    }
}
