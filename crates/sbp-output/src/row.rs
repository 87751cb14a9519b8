//! Plain data row types written by output backends.

use sbp_sim::{MunicipalitySnapshot, YearSnapshot, YearSummary};

/// National totals for one year.
///
/// The baseline row (the year before the start year) carries zero outcome
/// counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalYearRow {
    pub year:                u16,
    pub yearly_hectares:     f64,
    pub cumulative_hectares: f64,
    pub cumulative_fraction: f64,
    pub adopted:             u32,
    pub not_adopted:         u32,
    pub blocked:             u32,
}

impl NationalYearRow {
    pub fn from_summary(s: &YearSummary) -> Self {
        Self {
            year:                s.year.0,
            yearly_hectares:     s.yearly_hectares,
            cumulative_hectares: s.cumulative_hectares,
            cumulative_fraction: s.cumulative_fraction,
            adopted:             s.adopted as u32,
            not_adopted:         s.not_adopted as u32,
            blocked:             s.blocked as u32,
        }
    }

    pub fn baseline(s: &YearSnapshot) -> Self {
        Self {
            year:                s.year.0,
            yearly_hectares:     s.national_yearly_hectares,
            cumulative_hectares: s.national_cumulative_hectares,
            cumulative_fraction: s.national_cumulative_fraction,
            adopted:             0,
            not_adopted:         0,
            blocked:             0,
        }
    }
}

/// One municipality's ledger in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityYearRow {
    pub year:                u16,
    pub municipality_id:     u32,
    pub name:                String,
    pub district:            String,
    pub pastures_area:       f64,
    pub yearly_fraction:     f64,
    pub yearly_hectares:     f64,
    pub cumulative_fraction: f64,
    pub cumulative_hectares: f64,
}

impl MunicipalityYearRow {
    pub fn new(year: u16, m: &MunicipalitySnapshot) -> Self {
        Self {
            year,
            municipality_id:     m.id.0,
            name:                m.name.clone(),
            district:            m.district.clone(),
            pastures_area:       m.pastures_area,
            yearly_fraction:     m.yearly_fraction,
            yearly_hectares:     m.yearly_hectares,
            cumulative_fraction: m.cumulative_fraction,
            cumulative_hectares: m.cumulative_hectares,
        }
    }

    /// All rows of a snapshot, in municipality ID order.
    pub fn from_snapshot(s: &YearSnapshot) -> Vec<Self> {
        s.municipalities.iter().map(|m| Self::new(s.year.0, m)).collect()
    }
}
