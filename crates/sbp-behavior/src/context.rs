//! Read-only simulation state passed to every decision.

use sbp_agent::EnvironmentTable;
use sbp_core::Year;

use crate::PaymentSchedule;

/// A read-only snapshot of the run state shared by every municipality's
/// decision in one year.
///
/// Built once per step by sbp-sim and shared (immutably) across the compute
/// phase.  Everything in it reflects state committed up to the previous
/// year.
pub struct DecisionContext<'a> {
    /// The year being decided.
    pub year: Year,

    /// National cumulative adoption fraction committed up to `year - 1`.
    pub national_fraction: f64,

    /// Climate and soil lookup.
    pub environments: &'a EnvironmentTable,

    /// Payment schedule.
    pub payments: &'a PaymentSchedule,
}

impl<'a> DecisionContext<'a> {
    #[inline]
    pub fn new(
        year:              Year,
        national_fraction: f64,
        environments:      &'a EnvironmentTable,
        payments:          &'a PaymentSchedule,
    ) -> Self {
        Self { year, national_fraction, environments, payments }
    }
}
