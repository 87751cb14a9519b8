//! The `OutputWriter` trait implemented by all backend writers.

use crate::{MunicipalityYearRow, NationalYearRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors surface to the observer, which stores the first one for
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write one national series row.
    fn write_national(&mut self, row: &NationalYearRow) -> OutputResult<()>;

    /// Write a batch of municipality rows.
    fn write_municipalities(&mut self, rows: &[MunicipalityYearRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; calling it more than once is fine.
    fn finish(&mut self) -> OutputResult<()>;
}
