//! Read-only views of the simulation state handed to observers.

use sbp_agent::{Municipality, MunicipalityStore};
use sbp_core::{MunicipalityId, Year};

use crate::NationalAggregate;

/// One municipality's ledger as of a committed year.
#[derive(Clone, Debug, PartialEq)]
pub struct MunicipalitySnapshot {
    pub id:                  MunicipalityId,
    pub name:                String,
    pub district:            String,
    /// Pastures area available in the year, zero if not recorded.
    pub pastures_area:       f64,
    pub yearly_fraction:     f64,
    pub yearly_hectares:     f64,
    pub cumulative_fraction: f64,
    pub cumulative_hectares: f64,
}

impl MunicipalitySnapshot {
    fn of(m: &Municipality, year: Year) -> Self {
        Self {
            id:                  m.id,
            name:                m.name.clone(),
            district:            m.district.clone(),
            pastures_area:       m.pastures_in(year).unwrap_or(0.0),
            yearly_fraction:     m.yearly_fraction.get(&year).copied().unwrap_or(0.0),
            yearly_hectares:     m.yearly_hectares.get(&year).copied().unwrap_or(0.0),
            cumulative_fraction: m.cumulative_fraction,
            cumulative_hectares: m.cumulative_hectares,
        }
    }
}

/// National totals plus every municipality's ledger, in ID order.
///
/// Cumulative values are those currently committed, so a snapshot is only
/// meaningful for the last committed year.
#[derive(Clone, Debug, PartialEq)]
pub struct YearSnapshot {
    pub year:                         Year,
    pub national_yearly_hectares:     f64,
    pub national_cumulative_hectares: f64,
    pub national_cumulative_fraction: f64,
    pub municipalities:               Vec<MunicipalitySnapshot>,
}

impl YearSnapshot {
    pub(crate) fn capture(year: Year, store: &MunicipalityStore, national: &NationalAggregate) -> Self {
        Self {
            year,
            national_yearly_hectares:     national.yearly_in(year),
            national_cumulative_hectares: national.cumulative_hectares,
            national_cumulative_fraction: national.cumulative_fraction,
            municipalities:               store.iter().map(|m| MunicipalitySnapshot::of(m, year)).collect(),
        }
    }
}

/// Outcome counts and totals of one step.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct YearSummary {
    pub year:                Year,
    /// Municipalities that reached the regression stage, including those
    /// whose prediction was clamped to zero.
    pub adopted:             usize,
    pub not_adopted:         usize,
    pub blocked:             usize,
    /// National hectares adopted this year.
    pub yearly_hectares:     f64,
    /// National cumulative hectares after this year.
    pub cumulative_hectares: f64,
    /// National cumulative fraction of the reference area after this year.
    pub cumulative_fraction: f64,
}
