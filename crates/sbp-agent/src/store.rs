//! Core municipality storage: `MunicipalityStore` and `MunicipalityRngs`.
//!
//! # Why two structs?
//!
//! The parallel compute phase needs `&mut MunicipalityRngs` (exclusive access
//! to each municipality's RNG) and `&MunicipalityStore` (shared read access
//! to every ledger) at the same time.  Keeping the RNGs in their own struct
//! lets the borrow checker see the two borrows as disjoint:
//!
//! ```ignore
//! let store: &MunicipalityStore = &sim.municipalities;
//! let decisions = store
//!     .as_slice()
//!     .par_iter()
//!     .zip(sim.rngs.inner.par_iter_mut())
//!     .map(|(m, rng)| decide(m, &ctx, &models, rng))
//!     .collect::<Result<Vec<_>, _>>()?;
//! ```

use rustc_hash::FxHashMap;

use sbp_core::{MunicipalityId, MunicipalityRng, Year};

use crate::{AgentError, AgentResult, Municipality};

// ── MunicipalityRngs ──────────────────────────────────────────────────────────

/// Per-municipality deterministic RNG state, separated from
/// [`MunicipalityStore`] to allow `&mut MunicipalityRngs` +
/// `&MunicipalityStore` borrows in the compute phase.
pub struct MunicipalityRngs {
    pub inner: Vec<MunicipalityRng>,
}

impl MunicipalityRngs {
    /// Allocate and seed `count` per-municipality RNGs from `global_seed`.
    pub fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| MunicipalityRng::new(global_seed, MunicipalityId(i)))
            .collect();
        Self { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── MunicipalityStore ─────────────────────────────────────────────────────────

/// All municipalities of a run, indexed by [`MunicipalityId`].
///
/// `municipalities[id.index()]` is always the municipality with that ID; the
/// order is the input order and never changes during a run.
pub struct MunicipalityStore {
    municipalities: Vec<Municipality>,
    by_name:        FxHashMap<String, MunicipalityId>,
    reference_year: Year,
}

impl MunicipalityStore {
    pub(crate) fn new(municipalities: Vec<Municipality>, reference_year: Year) -> Self {
        let by_name = municipalities
            .iter()
            .map(|m| (m.name.clone(), m.id))
            .collect();
        Self { municipalities, by_name, reference_year }
    }

    /// Year whose pastures area set every municipality's reference area.
    #[inline]
    pub fn reference_year(&self) -> Year {
        self.reference_year
    }

    /// Number of municipalities.
    #[inline]
    pub fn len(&self) -> usize {
        self.municipalities.len()
    }

    /// `true` if there are no municipalities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }

    #[inline]
    pub fn get(&self, id: MunicipalityId) -> &Municipality {
        &self.municipalities[id.index()]
    }

    /// Mutable access.  Only call this during the commit phase.
    #[inline]
    pub fn get_mut(&mut self, id: MunicipalityId) -> &mut Municipality {
        &mut self.municipalities[id.index()]
    }

    /// Look up a municipality by name.
    pub fn find(&self, name: &str) -> Option<&Municipality> {
        self.by_name.get(name).map(|&id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Municipality> {
        self.municipalities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Municipality> {
        self.municipalities.iter_mut()
    }

    /// Read-only slice in ID order (e.g. for Rayon's `par_iter`).
    #[inline]
    pub fn as_slice(&self) -> &[Municipality] {
        &self.municipalities
    }

    /// Sum of every municipality's reference pastures area.
    pub fn total_reference_area(&self) -> f64 {
        self.municipalities.iter().map(|m| m.reference_area).sum()
    }

    /// Sum of every municipality's cumulative adopted hectares.
    pub fn total_cumulative_hectares(&self) -> f64 {
        self.municipalities.iter().map(|m| m.cumulative_hectares).sum()
    }

    /// Check that every municipality has a pastures area for each year in
    /// `first..=last`.
    ///
    /// Reports all offending municipalities in one
    /// [`AgentError::DataIntegrity`].
    pub fn check_pastures_coverage(&self, first: Year, last: Year) -> AgentResult<()> {
        let problems: Vec<(String, String)> = self
            .municipalities
            .iter()
            .filter_map(|m| {
                let gaps: Vec<String> = (first.0..=last.0)
                    .map(Year)
                    .filter(|y| m.pastures_in(*y).is_none())
                    .map(|y| y.to_string())
                    .collect();
                (!gaps.is_empty()).then(|| {
                    (m.name.clone(), format!("no pastures area for {}", gaps.join(", ")))
                })
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AgentError::data_integrity(problems))
        }
    }
}
