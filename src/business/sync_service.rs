use std::sync::Arc;

use tracing::{debug, error, info};

use crate::business::ports::{OrderSource, SheetStore};
use crate::business::projection::RowProjector;
use crate::business::reconcile::{MatchStrategy, NoteReconciler};
use crate::business::sheet_writer::SheetWriter;
use crate::config::Config;
use crate::domain::{MonthEnd, SyncMonth};
use crate::error::SyncError;

/// Result of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub month: SyncMonth,
    pub tab_created: bool,
    pub orders: usize,
    pub write_backs: usize,
    pub write_back_failures: Vec<i64>,
    pub rows_written: usize,
    pub rows_cleared: usize,
}

/// Runs the monthly export: fetch, project, reconcile notes, write back, overwrite.
pub struct SyncService {
    source: Arc<dyn OrderSource>,
    writer: SheetWriter,
    projector: RowProjector,
    reconciler: NoteReconciler,
    month_end: MonthEnd,
}

impl SyncService {
    pub fn new(
        source: Arc<dyn OrderSource>,
        sheet: Arc<dyn SheetStore>,
        config: &Config,
    ) -> Self {
        Self::builder(source, sheet)
            .ranges(&config.sheets.store_note_range, &config.sheets.order_id_range)
            .match_by(config.sync.match_by)
            .month_end(config.sync.month_end)
            .build()
    }

    pub fn builder(source: Arc<dyn OrderSource>, sheet: Arc<dyn SheetStore>) -> SyncServiceBuilder {
        SyncServiceBuilder::new(source, sheet)
    }

    /// Sync one month. Store and sheet reads must succeed before anything is
    /// written; individual write-back failures are logged and reported only.
    pub async fn run(&self, month: SyncMonth) -> Result<SyncReport, SyncError> {
        info!("Starting order sync for {}", month);

        let tab_created = self.writer.ensure_tab(&month).await?;
        let prior = self.writer.read_prior(&month).await?;
        debug!("Read {} previous rows from {}", prior.len(), month);

        let window = month.window(self.month_end);
        let orders = self.source.list_orders(&window).await?;
        info!("Fetched {} orders created in {}", orders.len(), month);

        let mut rows: Vec<_> = orders.iter().map(|o| self.projector.project(o)).collect();
        let decisions = self.reconciler.reconcile(&orders, &prior);

        let mut write_backs = 0;
        let mut write_back_failures = Vec::new();
        for (row, decision) in rows.iter_mut().zip(decisions) {
            if decision.write_back {
                write_backs += 1;
                match self
                    .source
                    .update_store_note(decision.entity_id, &decision.note)
                    .await
                {
                    Ok(record) => debug!(
                        "Store note of order {} saved as {:?}",
                        decision.entity_id,
                        record.store_note()
                    ),
                    Err(e) => {
                        error!(
                            "Failed to update store note of order {}: {}",
                            decision.entity_id, e
                        );
                        write_back_failures.push(decision.entity_id);
                    }
                }
            }
            row.fingerprint = decision.fingerprint;
            row.note = decision.note;
        }

        let order_count = rows.len();
        let summary = self.writer.write(&month, rows, prior.len()).await?;

        let report = SyncReport {
            month,
            tab_created,
            orders: order_count,
            write_backs,
            write_back_failures,
            rows_written: summary.rows_written,
            rows_cleared: summary.rows_cleared,
        };
        info!(
            "Order sync for {} finished: {} orders, {} note write-backs ({} failed)",
            month,
            report.orders,
            report.write_backs,
            report.write_back_failures.len()
        );
        Ok(report)
    }
}

pub struct SyncServiceBuilder {
    source: Arc<dyn OrderSource>,
    sheet: Arc<dyn SheetStore>,
    store_note_range: String,
    order_id_range: String,
    projector: RowProjector,
    match_by: MatchStrategy,
    month_end: MonthEnd,
}

impl SyncServiceBuilder {
    pub fn new(source: Arc<dyn OrderSource>, sheet: Arc<dyn SheetStore>) -> Self {
        Self {
            source,
            sheet,
            store_note_range: crate::config::DEFAULT_STORE_NOTE_RANGE.to_string(),
            order_id_range: crate::config::DEFAULT_ORDER_ID_RANGE.to_string(),
            projector: RowProjector::new(),
            match_by: MatchStrategy::default(),
            month_end: MonthEnd::default(),
        }
    }

    pub fn ranges(mut self, store_note_range: &str, order_id_range: &str) -> Self {
        self.store_note_range = store_note_range.to_string();
        self.order_id_range = order_id_range.to_string();
        self
    }

    pub fn projector(mut self, projector: RowProjector) -> Self {
        self.projector = projector;
        self
    }

    pub fn match_by(mut self, strategy: MatchStrategy) -> Self {
        self.match_by = strategy;
        self
    }

    pub fn month_end(mut self, month_end: MonthEnd) -> Self {
        self.month_end = month_end;
        self
    }

    pub fn build(self) -> SyncService {
        SyncService {
            source: self.source,
            writer: SheetWriter::new(self.sheet, self.store_note_range, self.order_id_range),
            projector: self.projector,
            reconciler: NoteReconciler::new(self.match_by),
            month_end: self.month_end,
        }
    }
}
