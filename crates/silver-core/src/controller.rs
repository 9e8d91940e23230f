//! Per-category run controller.
//!
//! One run walks `Idle → LedgerLoaded → LinesRead → RecordsTransformed →
//! Written → LedgerPersisted`. A missing or empty Source Table ends the run
//! after `LinesRead` without touching ledger or outputs, and an empty batch
//! ends it after `RecordsTransformed`.
//!
//! The ledger only learns a fingerprint after its row is durable in the
//! Current Table. The append is announced in a journal first so an
//! interrupted run is reconciled by the next one.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, info_span};

use silver_ingest::{SourceRead, read_source_table};
use silver_model::{Category, Layout, Schema};
use silver_store::{Fingerprint, HistorizedWriter, Journal, Ledger, PendingCommit, Recovery};
use silver_transform::{LineOutcome, SchemaTransform};

use crate::error::Result;
use crate::report::{CategoryReport, RunState, RunStatus};

#[derive(Debug)]
pub struct RunController<'a> {
    layout: &'a Layout,
    run_date: NaiveDate,
    state: RunState,
}

impl<'a> RunController<'a> {
    pub fn new(layout: &'a Layout, run_date: NaiveDate) -> Self {
        Self {
            layout,
            run_date,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState, report: &mut CategoryReport) {
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
        report.state = next;
    }

    /// Run one category to completion.
    ///
    /// Errors are fatal for this category only; the controller is back in
    /// `Idle` either way.
    pub fn run(&mut self, category: Category) -> Result<CategoryReport> {
        let span = info_span!("category", category = %category);
        let _guard = span.enter();
        self.state = RunState::Idle;
        let mut report = CategoryReport::new(category);
        let result = self.run_stages(category, &mut report);
        self.state = RunState::Idle;
        result.map(|()| report)
    }

    fn run_stages(&mut self, category: Category, report: &mut CategoryReport) -> Result<()> {
        let layout = self.layout;

        let ledger_path = layout.ledger(category);
        let mut ledger = Ledger::load(&ledger_path)?;
        let journal = Journal::for_ledger(&ledger_path);
        report.recovery = journal.recover(&mut ledger)?;
        if report.recovery != Recovery::Clean {
            info!(recovery = ?report.recovery, "resolved interrupted run");
        }
        self.advance(RunState::LedgerLoaded, report);

        let source_path = layout.source_table(category);
        let table = match read_source_table(&source_path)? {
            SourceRead::Missing => {
                info!(path = %source_path.display(), "source table not found, nothing to do");
                report.status = RunStatus::SourceMissing;
                return Ok(());
            }
            SourceRead::Empty => {
                info!(path = %source_path.display(), "source table is empty, nothing to do");
                report.status = RunStatus::SourceEmpty;
                return Ok(());
            }
            SourceRead::Table(table) => table,
        };
        report.lines_read = table.lines.len();
        self.advance(RunState::LinesRead, report);

        let transform = SchemaTransform::bind(Schema::for_category(category), &table.header)?;
        let mut records = Vec::new();
        let mut fingerprints = Vec::new();
        let mut batch = HashSet::new();
        for line in &table.lines {
            let fingerprint = Fingerprint::of_line(&line.text);
            if ledger.contains(&fingerprint) {
                report.already_processed += 1;
                continue;
            }
            if !batch.insert(fingerprint) {
                report.duplicates += 1;
                continue;
            }
            match transform.apply(line) {
                LineOutcome::Accepted(accepted) => {
                    report.record_issues(&accepted.issues);
                    records.push(accepted.record);
                    fingerprints.push(fingerprint);
                }
                LineOutcome::Rejected(_) => report.rejected += 1,
            }
        }
        self.advance(RunState::RecordsTransformed, report);
        info!(
            lines = report.lines_read,
            already_processed = report.already_processed,
            rejected = report.rejected,
            new_records = records.len(),
            "lines transformed"
        );

        let writer = HistorizedWriter::new(layout, self.run_date);
        let Some(prepared) = writer.prepare(transform.schema(), &records)? else {
            info!("no new records");
            report.status = RunStatus::UpToDate;
            return Ok(());
        };
        journal.begin(&PendingCommit {
            table: prepared.table.clone(),
            snapshot: prepared.snapshot.clone(),
            bytes_before: prepared.bytes_before,
            bytes_after: prepared.bytes_after(),
            fingerprints: fingerprints.clone(),
        })?;
        let outcome = writer.commit(&prepared)?;
        report.rows_written = outcome.rows;
        report.output = Some(outcome);
        self.advance(RunState::Written, report);

        ledger.append(&fingerprints)?;
        journal.clear()?;
        self.advance(RunState::LedgerPersisted, report);
        info!(
            rows = report.rows_written,
            ledger_entries = ledger.len(),
            "category written"
        );
        report.status = RunStatus::Written;
        Ok(())
    }
}

/// Run a single category with a fresh controller.
pub fn run_category(
    layout: &Layout,
    category: Category,
    run_date: NaiveDate,
) -> Result<CategoryReport> {
    RunController::new(layout, run_date).run(category)
}
