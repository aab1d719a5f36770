//! Detects operator edits to store notes between runs.
//!
//! Each data row of the month tab carries a fingerprint column next to the
//! three note columns. A run re-hashes the note columns it reads back; when
//! the stored fingerprint no longer matches, an operator has edited the note
//! since the last run and the note must be pushed to the store. The row is
//! then persisted with the fresh fingerprint, so the next run sees no change.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::domain::lenient::cell_text;
use crate::domain::{Order, StoreNote};

/// How a fetched order finds its row in the previous sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// By the order id column. Survives inserted, removed and reordered
    /// orders. Falls back to `Position` for sheets without order ids.
    #[default]
    OrderId,
    /// Sheet row `i` belongs to fetched order `i`.
    Position,
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "order_id" | "order-id" | "id" => Ok(MatchStrategy::OrderId),
            "position" | "row" => Ok(MatchStrategy::Position),
            other => Err(format!("unknown match strategy '{}'", other)),
        }
    }
}

/// One data row of the previous sheet state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorRow {
    pub order_id: Option<i64>,
    pub fingerprint: String,
    pub note: StoreNote,
}

impl PriorRow {
    /// Build from the store-note range cells: fingerprint, status, note,
    /// invoice ids. Missing trailing cells read as empty.
    pub fn from_cells(cells: &[Value]) -> Self {
        let cell = |i: usize| cells.get(i).map(cell_text).unwrap_or_default();
        Self {
            order_id: None,
            fingerprint: cell(0),
            note: StoreNote::new(cell(1), cell(2), cell(3)),
        }
    }

    pub fn with_order_id(mut self, order_id: Option<i64>) -> Self {
        self.order_id = order_id;
        self
    }

    /// Fingerprint of the note columns as they are now.
    pub fn candidate_fingerprint(&self) -> String {
        self.note.fingerprint()
    }

    /// The stored fingerprint is stale relative to the note columns.
    pub fn needs_write_back(&self) -> bool {
        self.fingerprint != self.candidate_fingerprint()
    }
}

/// Parse an order id cell; the sheet may hand back `5842`, `"5842"` or `"5842.0"`.
pub fn parse_order_id(cell: &Value) -> Option<i64> {
    let text = cell_text(cell);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Previous sheet state, one entry per data row in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorSheet {
    rows: Vec<PriorRow>,
}

impl PriorSheet {
    pub fn new(rows: Vec<PriorRow>) -> Self {
        Self { rows }
    }

    /// Zip the store-note range with the order id column by row.
    ///
    /// The API omits trailing rows whose cells are all empty, so a tab of
    /// rows with blank notes reads back as an empty note range. The row count
    /// is whichever range reaches further down; missing cells read as empty.
    pub fn from_ranges(note_rows: &[Vec<Value>], id_rows: &[Vec<Value>]) -> Self {
        let count = note_rows.len().max(id_rows.len());
        let rows = (0..count)
            .map(|i| {
                let cells = note_rows.get(i).map(Vec::as_slice).unwrap_or_default();
                let order_id = id_rows.get(i).and_then(|r| r.first()).and_then(parse_order_id);
                PriorRow::from_cells(cells).with_order_id(order_id)
            })
            .collect();
        Self { rows }
    }

    /// Data rows the tab held, over both ranges.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[PriorRow] {
        &self.rows
    }

    pub fn has_order_ids(&self) -> bool {
        self.rows.iter().any(|row| row.order_id.is_some())
    }
}

/// Outcome for one fetched order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDecision {
    pub entity_id: i64,
    /// Index into the prior sheet, `None` for an order seen for the first time.
    pub prior_row: Option<usize>,
    /// Fingerprint to persist; empty for a new row.
    pub fingerprint: String,
    /// Note columns to persist.
    pub note: StoreNote,
    pub write_back: bool,
}

impl NoteDecision {
    fn new_row(entity_id: i64) -> Self {
        Self {
            entity_id,
            prior_row: None,
            fingerprint: String::new(),
            note: StoreNote::default(),
            write_back: false,
        }
    }

    fn from_prior(entity_id: i64, index: usize, prior: &PriorRow) -> Self {
        Self {
            entity_id,
            prior_row: Some(index),
            fingerprint: prior.candidate_fingerprint(),
            note: prior.note.clone(),
            write_back: prior.needs_write_back(),
        }
    }
}

pub struct NoteReconciler {
    strategy: MatchStrategy,
}

impl Default for NoteReconciler {
    fn default() -> Self {
        Self::new(MatchStrategy::default())
    }
}

impl NoteReconciler {
    pub fn new(strategy: MatchStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// One decision per order, in order. Every prior row is matched at most
    /// once, so no note is written back twice in a run.
    pub fn reconcile(&self, orders: &[Order], prior: &PriorSheet) -> Vec<NoteDecision> {
        let by_id = self.strategy == MatchStrategy::OrderId && prior.has_order_ids();
        if self.strategy == MatchStrategy::OrderId && !by_id && !prior.is_empty() {
            debug!("Previous sheet has no order ids, matching rows by position");
        }

        let matches = if by_id {
            match_by_order_id(orders, prior)
        } else {
            (0..orders.len())
                .map(|i| (i < prior.len()).then_some(i))
                .collect()
        };

        orders
            .iter()
            .zip(matches)
            .map(|(order, matched)| {
                let decision = match matched {
                    Some(index) => NoteDecision::from_prior(order.entity_id, index, &prior.rows[index]),
                    None => NoteDecision::new_row(order.entity_id),
                };
                if decision.write_back {
                    debug!(
                        "Store note of order {} changed in sheet row {:?}",
                        order.entity_id, decision.prior_row
                    );
                }
                decision
            })
            .collect()
    }
}

fn match_by_order_id(orders: &[Order], prior: &PriorSheet) -> Vec<Option<usize>> {
    let mut rows_by_id: HashMap<i64, VecDeque<usize>> = HashMap::new();
    for (index, row) in prior.rows.iter().enumerate() {
        if let Some(id) = row.order_id {
            rows_by_id.entry(id).or_default().push_back(index);
        }
    }

    orders
        .iter()
        .map(|order| {
            rows_by_id
                .get_mut(&order.entity_id)
                .and_then(VecDeque::pop_front)
        })
        .collect()
}
