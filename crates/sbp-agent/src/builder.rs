//! Fluent builder for constructing `MunicipalityStore` + `MunicipalityRngs`
//! in one step.
//!
//! # Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use sbp_agent::{MunicipalityRecord, MunicipalityStoreBuilder};
//! use sbp_core::{FeatureMap, Year};
//!
//! let record = MunicipalityRecord {
//!     name:          "Mértola".into(),
//!     district:      "Beja".into(),
//!     pastures_area: (1995..=2012).map(|y| (Year(y), 1_000.0)).collect(),
//!     census:        (1995..=2012).map(|y| (Year(y), FeatureMap::new())).collect(),
//!     adoption:      BTreeMap::from([(Year(1995), 0.01)]),
//! };
//!
//! let (store, rngs) = MunicipalityStoreBuilder::new(Year(1996), /*seed=*/ 42)
//!     .municipality(record)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.len(), 1);
//! assert_eq!(rngs.len(),  1);
//! ```

use std::collections::BTreeMap;

use sbp_core::{EARLIEST_DATA_YEAR, FeatureMap, MunicipalityId, Year};

use crate::{AgentError, AgentResult, Municipality, MunicipalityRngs, MunicipalityStore};

/// Raw per-municipality input, as produced by the dataset loaders.
///
/// Missing dataset cells are carried as `NaN` so the builder can report them.
#[derive(Clone, Debug, Default)]
pub struct MunicipalityRecord {
    pub name:          String,
    pub district:      String,
    /// Pastures area in hectares, per year.
    pub pastures_area: BTreeMap<Year, f64>,
    /// Census covariates, per year.
    pub census:        BTreeMap<Year, FeatureMap>,
    /// Historic adoption fractions.  Years at or after the start year are
    /// ignored.
    pub adoption:      BTreeMap<Year, f64>,
}

/// Fluent builder for [`MunicipalityStore`] + [`MunicipalityRngs`].
///
/// Validation happens in [`build`](Self::build): every record is checked and
/// every problem is reported together, so one run of the loader tells you
/// everything that is wrong with a dataset.
pub struct MunicipalityStoreBuilder {
    start_year:     Year,
    reference_year: Year,
    seed:           u64,
    records:        Vec<MunicipalityRecord>,
}

impl MunicipalityStoreBuilder {
    /// Create a builder for a run starting at `start_year`, with `seed` as
    /// the global seed for per-municipality RNGs.
    pub fn new(start_year: Year, seed: u64) -> Self {
        Self {
            start_year,
            reference_year: Year(2009),
            seed,
            records: Vec::new(),
        }
    }

    /// Year whose pastures area becomes each municipality's reference area.
    /// Default: 2009.
    pub fn reference_year(mut self, year: Year) -> Self {
        self.reference_year = year;
        self
    }

    /// Append one municipality.  IDs are assigned in call order.
    pub fn municipality(mut self, record: MunicipalityRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Append many municipalities in iteration order.
    pub fn municipalities(mut self, records: impl IntoIterator<Item = MunicipalityRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Validate all records, seed historic adoption and construct the store.
    pub fn build(self) -> AgentResult<(MunicipalityStore, MunicipalityRngs)> {
        let problems: Vec<(String, String)> = self
            .records
            .iter()
            .enumerate()
            .flat_map(|(i, r)| {
                let earlier = &self.records[..i];
                record_problems(r, self.reference_year, earlier)
                    .into_iter()
                    .map(move |p| (r.name.clone(), p))
            })
            .collect();
        if !problems.is_empty() {
            return Err(AgentError::data_integrity(problems));
        }

        let count = self.records.len();
        let mut municipalities = Vec::with_capacity(count);

        for (i, record) in self.records.into_iter().enumerate() {
            // Presence checked by record_problems.
            let reference_area = record.pastures_area[&self.reference_year];
            let mut m = Municipality::new(
                MunicipalityId(i as u32),
                record.name,
                record.district,
                record.pastures_area,
                reference_area,
                record.census,
            );
            for (year, fraction) in record.adoption.range(..self.start_year) {
                m.seed_history(*year, *fraction);
            }
            municipalities.push(m);
        }

        let store = MunicipalityStore::new(municipalities, self.reference_year);
        let rngs = MunicipalityRngs::new(count, self.seed);
        Ok((store, rngs))
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

fn record_problems(
    record:         &MunicipalityRecord,
    reference_year: Year,
    earlier:        &[MunicipalityRecord],
) -> Vec<String> {
    let mut problems = Vec::new();

    if earlier.iter().any(|e| e.name == record.name) {
        problems.push("duplicate municipality name".to_owned());
    }

    if record.pastures_area.is_empty() {
        problems.push("no pastures area data".to_owned());
    } else if !record.pastures_area.contains_key(&reference_year) {
        problems.push(format!("no pastures area for reference year {reference_year}"));
    }
    let bad_pastures: Vec<String> = record
        .pastures_area
        .iter()
        .filter(|(_, v)| !v.is_finite() || **v < 0.0)
        .map(|(y, _)| y.to_string())
        .collect();
    if !bad_pastures.is_empty() {
        problems.push(format!("invalid pastures area in {}", bad_pastures.join(", ")));
    }

    if record.census.is_empty() {
        problems.push("no census data".to_owned());
    }
    for (year, row) in &record.census {
        let missing: Vec<&str> = row
            .iter()
            .filter(|(_, v)| !v.is_finite())
            .map(|(k, _)| k.as_str())
            .collect();
        if !missing.is_empty() {
            problems.push(format!("census {year} missing {}", missing.join(", ")));
        }
    }

    let too_early: Vec<String> = record
        .adoption
        .range(..EARLIEST_DATA_YEAR)
        .map(|(y, _)| y.to_string())
        .collect();
    if !too_early.is_empty() {
        problems.push(format!(
            "historic adoption for {} is before {EARLIEST_DATA_YEAR}",
            too_early.join(", ")
        ));
    }

    let bad_adoption: Vec<String> = record
        .adoption
        .iter()
        .filter(|(_, v)| !v.is_finite())
        .map(|(y, _)| y.to_string())
        .collect();
    if !bad_adoption.is_empty() {
        problems.push(format!("missing historic adoption for {}", bad_adoption.join(", ")));
    }

    problems
}
