use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::business::ports::SheetStore;
use crate::business::projection::{header_row, ExportRow, DISPLAY_COLUMNS, NOTE_COLUMNS};
use crate::business::reconcile::PriorSheet;
use crate::domain::SyncMonth;
use crate::sheets::models::a1_range;
use crate::sheets::SheetsError;

/// What a write did to the month tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Rows written, header included.
    pub rows_written: usize,
    /// Stale data rows left over from a longer previous export, now blank.
    pub rows_cleared: usize,
}

/// Owns the month tab: creation, reading previous state, full overwrite.
pub struct SheetWriter {
    store: Arc<dyn SheetStore>,
    store_note_range: String,
    order_id_range: String,
}

impl SheetWriter {
    pub fn new(
        store: Arc<dyn SheetStore>,
        store_note_range: impl Into<String>,
        order_id_range: impl Into<String>,
    ) -> Self {
        Self {
            store,
            store_note_range: store_note_range.into(),
            order_id_range: order_id_range.into(),
        }
    }

    /// Make sure the month tab exists. Returns `true` when it had to be created.
    ///
    /// Any failure to read `A1` is taken to mean the tab is missing.
    pub async fn ensure_tab(&self, month: &SyncMonth) -> Result<bool, SheetsError> {
        let tab = month.tab_name();
        match self.store.read_range(&a1_range(&tab, "!A1")).await {
            Ok(_) => {
                debug!("Sheet tab {} exists", tab);
                Ok(false)
            }
            Err(SheetsError::TabNotFound(_)) => {
                info!("Creating sheet tab {}", tab);
                self.store.add_sheet(&tab).await?;
                Ok(true)
            }
            Err(read_error) => {
                warn!("Reading A1 of sheet tab {} failed, adding it: {}", tab, read_error);
                self.store.add_sheet(&tab).await?;
                Ok(true)
            }
        }
    }

    /// Read the fingerprint/note columns and the order id column of the tab.
    pub async fn read_prior(&self, month: &SyncMonth) -> Result<PriorSheet, SheetsError> {
        let tab = month.tab_name();
        let note_rows = self
            .store
            .read_range(&a1_range(&tab, &self.store_note_range))
            .await?;
        let id_rows = self
            .store
            .read_range(&a1_range(&tab, &self.order_id_range))
            .await?;

        let prior = PriorSheet::from_ranges(&note_rows, &id_rows);
        debug!(
            "{} previous rows in {}, {} with store note cells",
            prior.len(),
            tab,
            note_rows.len()
        );
        Ok(prior)
    }

    /// Replace the tab content with the header and one row per order, then
    /// blank any data rows the previous export had beyond the new end.
    pub async fn write(
        &self,
        month: &SyncMonth,
        rows: Vec<ExportRow>,
        previous_rows: usize,
    ) -> Result<WriteSummary, SheetsError> {
        let tab = month.tab_name();
        let data_rows = rows.len();
        let values = staged_values(rows);
        let rows_written = values.len();

        self.store.write_range(&a1_range(&tab, "!A1"), values).await?;
        info!("Wrote {} orders to sheet tab {}", data_rows, tab);

        let mut rows_cleared = 0;
        if previous_rows > data_rows {
            let first_stale = data_rows + 2;
            let range = format!("!A{}:{}", first_stale, column_letter(total_columns()));
            match self.store.clear_range(&a1_range(&tab, &range)).await {
                Ok(()) => rows_cleared = previous_rows - data_rows,
                Err(e) => warn!("Unable to clear stale rows {} of {}: {}", range, tab, e),
            }
        }

        Ok(WriteSummary {
            rows_written,
            rows_cleared,
        })
    }
}

/// The complete tab content: header followed by the rows in order.
pub fn staged_values(rows: Vec<ExportRow>) -> Vec<Vec<Value>> {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(header_row());
    values.extend(rows.into_iter().map(ExportRow::into_values));
    values
}

pub fn total_columns() -> usize {
    DISPLAY_COLUMNS.len() + NOTE_COLUMNS.len()
}

/// Spreadsheet column name for a 1-based index: 1 is `A`, 27 is `AA`.
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}
