//! Simulation observer trait for progress reporting and data collection.

use sbp_core::Year;

use crate::{YearSnapshot, YearSummary};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// year loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_year_end(&mut self, summary: &YearSummary) {
///         println!("{}: {:.0} ha adopted", summary.year, summary.yearly_hectares);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once before the first step with the state of the year before
    /// the start year (historic data only).
    fn on_sim_start(&mut self, _baseline: &YearSnapshot) {}

    /// Called at the very start of each year, before any processing.
    fn on_year_start(&mut self, _year: Year) {}

    /// Called after the year is committed.
    fn on_year_end(&mut self, _summary: &YearSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_years`
    /// years, counting from the start year).
    fn on_snapshot(&mut self, _snapshot: &YearSnapshot) {}

    /// Called once after the final year completes.  `final_year` is the
    /// last committed year.
    fn on_sim_end(&mut self, _final_year: Year) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
