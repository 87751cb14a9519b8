//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use sbp_core::Year;
use sbp_sim::{SimObserver, YearSnapshot, YearSummary};
use tracing::warn;

use crate::row::{MunicipalityYearRow, NationalYearRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes the national series and municipality
/// snapshots to any [`OutputWriter`] backend (CSV, SQLite, …).
///
/// The baseline year goes to both outputs; every committed year adds a
/// national row, and every snapshot adds one row per municipality.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed; later errors are dropped");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_sim_start(&mut self, baseline: &YearSnapshot) {
        let result = self.writer.write_national(&NationalYearRow::baseline(baseline));
        self.store_err(result);
        let result = self
            .writer
            .write_municipalities(&MunicipalityYearRow::from_snapshot(baseline));
        self.store_err(result);
    }

    fn on_year_end(&mut self, summary: &YearSummary) {
        let result = self.writer.write_national(&NationalYearRow::from_summary(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, snapshot: &YearSnapshot) {
        let rows = MunicipalityYearRow::from_snapshot(snapshot);
        if !rows.is_empty() {
            let result = self.writer.write_municipalities(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_year: Year) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
