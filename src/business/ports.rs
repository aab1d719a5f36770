use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Order, OrderWindow, StoreNote};
use crate::magento::{MagentoError, StoreNoteRecord};
use crate::sheets::SheetsError;

/// The commerce system: source of orders and system of record for notes.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// All orders created inside the window, in the order the store returns them.
    async fn list_orders(&self, window: &OrderWindow) -> Result<Vec<Order>, MagentoError>;

    /// Persist an operator note on the order with the given entity id.
    async fn update_store_note(
        &self,
        entity_id: i64,
        note: &StoreNote,
    ) -> Result<StoreNoteRecord, MagentoError>;
}

/// A spreadsheet addressed with A1 ranges such as `'2019-12'!A1`.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read a range as rows of loosely-typed cells. Trailing empty cells and
    /// rows may be missing.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<Value>>, SheetsError>;

    /// Add a worksheet tab with the given title.
    async fn add_sheet(&self, title: &str) -> Result<(), SheetsError>;

    /// Overwrite cells starting at the range's top-left corner with literal values.
    async fn write_range(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<(), SheetsError>;

    /// Blank out every cell in the range.
    async fn clear_range(&self, range: &str) -> Result<(), SheetsError>;
}
