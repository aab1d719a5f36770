//! In-memory stand-ins for the store and the spreadsheet.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::business::ports::{OrderSource, SheetStore};
use crate::domain::{Order, OrderWindow, StoreNote};
use crate::magento::{MagentoError, StoreNoteRecord};
use crate::sheets::SheetsError;

#[derive(Default)]
pub struct FakeStore {
    orders: Vec<Order>,
    fail_listing: bool,
    failing_ids: HashSet<i64>,
    windows: RwLock<Vec<OrderWindow>>,
    updates: RwLock<Vec<(i64, StoreNote)>>,
}

impl FakeStore {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders,
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_listing: true,
            ..Default::default()
        }
    }

    pub fn failing_update(mut self, entity_id: i64) -> Self {
        self.failing_ids.insert(entity_id);
        self
    }

    pub fn updates(&self) -> Vec<(i64, StoreNote)> {
        self.updates.read().unwrap().clone()
    }

    pub fn windows(&self) -> Vec<OrderWindow> {
        self.windows.read().unwrap().clone()
    }
}

#[async_trait]
impl OrderSource for FakeStore {
    async fn list_orders(&self, window: &OrderWindow) -> Result<Vec<Order>, MagentoError> {
        self.windows.write().unwrap().push(window.clone());
        if self.fail_listing {
            return Err(MagentoError::ApiError("HTTP 503: unavailable".to_string()));
        }
        Ok(self.orders.clone())
    }

    async fn update_store_note(
        &self,
        entity_id: i64,
        note: &StoreNote,
    ) -> Result<StoreNoteRecord, MagentoError> {
        self.updates.write().unwrap().push((entity_id, note.clone()));
        if self.failing_ids.contains(&entity_id) {
            return Err(MagentoError::ApiError("HTTP 500: boom".to_string()));
        }
        Ok(StoreNoteRecord {
            sales_order_id: entity_id,
            note: note.note.clone(),
            status: note.status.clone(),
            erply_invoice_ids: note.erply_invoice_ids.clone(),
            ..Default::default()
        })
    }
}

#[derive(Default)]
struct SheetState {
    tabs: Vec<String>,
    grids: HashMap<String, Vec<Vec<Value>>>,
    writes: Vec<(String, Vec<Vec<Value>>)>,
    clears: Vec<String>,
}

/// A1 range resolved to zero-based bounds; `last_row` is open for `B2:B`.
struct Area {
    tab: String,
    first_col: usize,
    last_col: usize,
    first_row: usize,
    last_row: Option<usize>,
}

impl Area {
    fn parse(range: &str) -> Self {
        let (tab, cells) = range
            .trim_start_matches('\'')
            .split_once("'!")
            .unwrap_or((range, "A1"));
        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let (first_col, first_row) = Self::cell(start);
        let (last_col, last_row) = Self::cell(end);
        Self {
            tab: tab.to_string(),
            first_col,
            last_col,
            first_row: first_row.unwrap_or(0),
            last_row,
        }
    }

    fn cell(cell: &str) -> (usize, Option<usize>) {
        let digits = cell.find(|c: char| c.is_ascii_digit()).unwrap_or(cell.len());
        let col = cell[..digits]
            .bytes()
            .fold(0, |acc, b| acc * 26 + (b - b'A' + 1) as usize);
        let row = cell[digits..].parse::<usize>().ok().map(|r| r - 1);
        (col - 1, row)
    }
}

fn is_blank(cell: &Value) -> bool {
    cell.is_null() || cell.as_str() == Some("")
}

/// A spreadsheet backed by an in-memory grid per tab. Reads drop trailing
/// empty cells and rows the way the Sheets API does.
#[derive(Default)]
pub struct FakeSheet {
    state: RwLock<SheetState>,
    fail_reads: bool,
}

impl FakeSheet {
    pub fn with_tab(title: &str) -> Self {
        let sheet = Self::default();
        sheet.state.write().unwrap().tabs.push(title.to_string());
        sheet
    }

    pub fn unreadable(title: &str) -> Self {
        let mut sheet = Self::with_tab(title);
        sheet.fail_reads = true;
        sheet
    }

    /// Put cells into the grid without recording a write.
    pub fn set_range(&self, range: &str, rows: Vec<Vec<Value>>) {
        let mut state = self.state.write().unwrap();
        Self::place(&mut *state, &Area::parse(range), rows);
    }

    pub fn tabs(&self) -> Vec<String> {
        self.state.read().unwrap().tabs.clone()
    }

    pub fn writes(&self) -> Vec<(String, Vec<Vec<Value>>)> {
        self.state.read().unwrap().writes.clone()
    }

    pub fn clears(&self) -> Vec<String> {
        self.state.read().unwrap().clears.clone()
    }

    fn place(state: &mut SheetState, area: &Area, rows: Vec<Vec<Value>>) {
        let grid = state.grids.entry(area.tab.clone()).or_default();
        for (r, cells) in rows.into_iter().enumerate() {
            let row_index = area.first_row + r;
            if grid.len() <= row_index {
                grid.resize(row_index + 1, Vec::new());
            }
            let row = &mut grid[row_index];
            for (c, value) in cells.into_iter().enumerate() {
                let col_index = area.first_col + c;
                if row.len() <= col_index {
                    row.resize(col_index + 1, Value::Null);
                }
                row[col_index] = value;
            }
        }
    }
}

#[async_trait]
impl SheetStore for FakeSheet {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<Value>>, SheetsError> {
        let state = self.state.read().unwrap();
        let area = Area::parse(range);
        if !state.tabs.contains(&area.tab) {
            return Err(SheetsError::TabNotFound(format!(
                "Unable to parse range: {}",
                range
            )));
        }
        if self.fail_reads && !range.ends_with("!A1") {
            return Err(SheetsError::ApiError("HTTP 500: backend error".to_string()));
        }

        let empty: Vec<Vec<Value>> = Vec::new();
        let grid = state.grids.get(&area.tab).unwrap_or(&empty);
        let end = area.last_row.map_or(grid.len(), |r| (r + 1).min(grid.len()));
        let mut rows: Vec<Vec<Value>> = (area.first_row..end.max(area.first_row))
            .map(|r| {
                let mut cells: Vec<Value> = (area.first_col..=area.last_col)
                    .map(|c| match grid[r].get(c) {
                        Some(cell) if !cell.is_null() => cell.clone(),
                        _ => Value::String(String::new()),
                    })
                    .collect();
                while cells.last().map_or(false, is_blank) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while rows.last().map_or(false, Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn add_sheet(&self, title: &str) -> Result<(), SheetsError> {
        self.state.write().unwrap().tabs.push(title.to_string());
        Ok(())
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<(), SheetsError> {
        let mut state = self.state.write().unwrap();
        state.writes.push((range.to_string(), rows.clone()));
        Self::place(&mut *state, &Area::parse(range), rows);
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<(), SheetsError> {
        let mut state = self.state.write().unwrap();
        state.clears.push(range.to_string());
        let area = Area::parse(range);
        if let Some(grid) = state.grids.get_mut(&area.tab) {
            let end = area.last_row.map_or(grid.len(), |r| (r + 1).min(grid.len()));
            for row in grid.iter_mut().take(end).skip(area.first_row) {
                for cell in row.iter_mut().take(area.last_col + 1).skip(area.first_col) {
                    *cell = Value::Null;
                }
            }
        }
        Ok(())
    }
}
