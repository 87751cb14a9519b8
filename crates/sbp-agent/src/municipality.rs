//! One municipality: static datasets plus its running adoption ledger.

use std::collections::BTreeMap;

use sbp_core::{FeatureMap, MunicipalityId, Year};

use crate::{AgentError, AgentResult};

// ── StagedAdoption ────────────────────────────────────────────────────────────

/// A computed-but-not-yet-committed adoption for the current year.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StagedAdoption {
    /// Adopted area divided by the reference area.
    pub fraction: f64,
    /// Adopted area in hectares.
    pub hectares: f64,
    /// `Some(area)` when the adoption was clamped to the available pastures
    /// area; commit then pins cumulative hectares to exactly `area`.
    pub capacity: Option<f64>,
}

impl StagedAdoption {
    /// No adoption this year.
    pub const NONE: StagedAdoption = StagedAdoption { fraction: 0.0, hectares: 0.0, capacity: None };
}

// ── Municipality ──────────────────────────────────────────────────────────────

/// A municipality agent.
///
/// Static fields are set once by
/// [`MunicipalityStoreBuilder`][crate::MunicipalityStoreBuilder] and never
/// mutated.  Ledger fields change only through [`commit`][Self::commit],
/// once per simulated year.
#[derive(Clone, Debug)]
pub struct Municipality {
    pub id:       MunicipalityId,
    pub name:     String,
    pub district: String,

    // ── Static data ───────────────────────────────────────────────────────
    /// Permanent pastures area in hectares, per year.
    pub pastures_area: BTreeMap<Year, f64>,

    /// Pastures area in the reference year.  Converts fractions to hectares.
    pub reference_area: f64,

    /// Census covariates, per year.
    pub census: BTreeMap<Year, FeatureMap>,

    // ── Ledger ────────────────────────────────────────────────────────────
    /// Adoption fraction per year (historic years included).
    pub yearly_fraction: BTreeMap<Year, f64>,

    /// Adoption in hectares per year (historic years included).
    pub yearly_hectares: BTreeMap<Year, f64>,

    /// Sum of `yearly_fraction`.
    pub cumulative_fraction: f64,

    /// Sum of `yearly_hectares`, except after a capacity clamp, where it is
    /// pinned to the available area of that year.
    pub cumulative_hectares: f64,

    staged: Option<StagedAdoption>,
}

impl Municipality {
    pub(crate) fn new(
        id:             MunicipalityId,
        name:           String,
        district:       String,
        pastures_area:  BTreeMap<Year, f64>,
        reference_area: f64,
        census:         BTreeMap<Year, FeatureMap>,
    ) -> Self {
        Self {
            id,
            name,
            district,
            pastures_area,
            reference_area,
            census,
            yearly_fraction:     BTreeMap::new(),
            yearly_hectares:     BTreeMap::new(),
            cumulative_fraction: 0.0,
            cumulative_hectares: 0.0,
            staged:              None,
        }
    }

    /// Pastures area available in `year`, if the dataset covers it.
    #[inline]
    pub fn pastures_in(&self, year: Year) -> Option<f64> {
        self.pastures_area.get(&year).copied()
    }

    /// Census covariates recorded for `year`.
    #[inline]
    pub fn census_for(&self, year: Year) -> Option<&FeatureMap> {
        self.census.get(&year)
    }

    /// Record one historic year before the simulation starts.
    pub(crate) fn seed_history(&mut self, year: Year, fraction: f64) {
        let hectares = fraction * self.reference_area;
        self.yearly_fraction.insert(year, fraction);
        self.yearly_hectares.insert(year, hectares);
        self.cumulative_fraction += fraction;
        self.cumulative_hectares += hectares;
    }

    // ── Compute / commit bridge ───────────────────────────────────────────

    /// The value staged for the current year, if any.
    #[inline]
    pub fn staged(&self) -> Option<StagedAdoption> {
        self.staged
    }

    /// Store this year's decision.  Write-once: a second call before
    /// [`commit`][Self::commit] fails.
    pub fn stage(&mut self, staged: StagedAdoption) -> AgentResult<()> {
        if self.staged.is_some() {
            return Err(AgentError::AlreadyStaged(self.id));
        }
        self.staged = Some(staged);
        Ok(())
    }

    /// Apply the staged value to the ledger for `year` and clear the slot.
    ///
    /// Returns the hectare delta to add to the national total, or `None` if
    /// nothing was staged.
    pub fn commit(&mut self, year: Year) -> Option<f64> {
        let staged = self.staged.take()?;

        self.yearly_fraction.insert(year, staged.fraction);
        self.yearly_hectares.insert(year, staged.hectares);
        self.cumulative_fraction += staged.fraction;
        self.cumulative_hectares = match staged.capacity {
            Some(area) => area,
            None       => self.cumulative_hectares + staged.hectares,
        };

        Some(staged.hectares)
    }
}
