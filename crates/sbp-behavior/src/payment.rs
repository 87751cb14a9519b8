//! Government payment schedule.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use sbp_core::Year;

use crate::{BehaviorError, BehaviorResult};

/// Payment offered to adopt SBP, in €/ha, per year.
///
/// When an eligibility set is configured, municipalities outside it are
/// offered nothing in any year.
#[derive(Clone, Debug, Default)]
pub struct PaymentSchedule {
    by_year:  BTreeMap<Year, f64>,
    eligible: Option<FxHashSet<String>>,
}

impl PaymentSchedule {
    /// A schedule open to every municipality.
    pub fn new(by_year: impl IntoIterator<Item = (Year, f64)>) -> Self {
        Self {
            by_year:  by_year.into_iter().collect(),
            eligible: None,
        }
    }

    /// Restrict payments to the named municipalities.
    pub fn with_eligibility<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.eligible = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// `true` if `municipality` may receive payments.
    pub fn is_eligible(&self, municipality: &str) -> bool {
        self.eligible
            .as_ref()
            .is_none_or(|set| set.contains(municipality))
    }

    /// First and last year of the table.
    pub fn range(&self) -> Option<(Year, Year)> {
        let first = *self.by_year.keys().next()?;
        let last = *self.by_year.keys().next_back()?;
        Some((first, last))
    }

    /// Effective payment for `municipality` in `year`.
    ///
    /// Ineligible municipalities get `0.0` without consulting the table.
    /// Otherwise a year absent from the table fails with
    /// [`BehaviorError::PaymentNotAvailable`].
    pub fn get(&self, year: Year, municipality: &str) -> BehaviorResult<f64> {
        if !self.is_eligible(municipality) {
            return Ok(0.0);
        }
        self.by_year
            .get(&year)
            .copied()
            .ok_or(BehaviorError::PaymentNotAvailable { year, range: self.range() })
    }
}
