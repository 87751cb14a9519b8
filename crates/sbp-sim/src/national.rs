//! National adoption totals.

use std::collections::BTreeMap;

use sbp_agent::MunicipalityStore;
use sbp_core::{EARLIEST_DATA_YEAR, Year};

/// Country-wide adoption ledger.
///
/// Receives each municipality's hectare delta during the commit phase and
/// folds them into the yearly series once every municipality has committed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NationalAggregate {
    /// Adopted hectares per year, historic years included.
    pub yearly_hectares:      BTreeMap<Year, f64>,
    pub cumulative_hectares:  f64,
    /// `cumulative_hectares / total_reference_area`.
    pub cumulative_fraction:  f64,
    /// Sum of the municipalities' reference areas.
    pub total_reference_area: f64,
    staged_delta_hectares:    f64,
}

impl NationalAggregate {
    /// Seed the historic series for every year from 1995 up to the year
    /// before `start_year`.  Years without data count as zero.
    pub fn from_store(store: &MunicipalityStore, start_year: Year) -> Self {
        let yearly_hectares: BTreeMap<Year, f64> = (EARLIEST_DATA_YEAR.0..start_year.0)
            .map(Year)
            .map(|year| {
                let total = store
                    .iter()
                    .filter_map(|m| m.yearly_hectares.get(&year))
                    .sum::<f64>();
                (year, total)
            })
            .collect();
        let cumulative_hectares = yearly_hectares.values().sum();
        let mut national = Self {
            yearly_hectares,
            cumulative_hectares,
            cumulative_fraction: 0.0,
            total_reference_area: store.total_reference_area(),
            staged_delta_hectares: 0.0,
        };
        national.recompute_fraction();
        national
    }

    /// Add one municipality's committed hectare delta to this year's total.
    #[inline]
    pub fn stage(&mut self, delta_hectares: f64) {
        self.staged_delta_hectares += delta_hectares;
    }

    /// Hectares staged so far this year.
    #[inline]
    pub fn staged_delta(&self) -> f64 {
        self.staged_delta_hectares
    }

    /// Record the staged total as `year`'s adoption and reset the stage.
    /// Returns the yearly total.
    pub fn commit(&mut self, year: Year) -> f64 {
        let delta = std::mem::take(&mut self.staged_delta_hectares);
        self.yearly_hectares.insert(year, delta);
        self.cumulative_hectares += delta;
        self.recompute_fraction();
        delta
    }

    /// Hectares adopted in `year`, zero if not recorded.
    pub fn yearly_in(&self, year: Year) -> f64 {
        self.yearly_hectares.get(&year).copied().unwrap_or(0.0)
    }

    fn recompute_fraction(&mut self) {
        self.cumulative_fraction = if self.total_reference_area > 0.0 {
            self.cumulative_hectares / self.total_reference_area
        } else {
            0.0
        };
    }
}
