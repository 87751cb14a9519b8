//! Whole-dataset loading from a directory of CSV files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use sbp_agent::{AgentError, Environment, EnvironmentTable, MunicipalityRecord};
use sbp_behavior::PaymentSchedule;
use sbp_core::Year;

use crate::loader::{
    ADOPTION_FILE, CENSUS_FILE, CLIMATE_FILE, ELIGIBLE_FILE, MUNICIPALITIES_FILE, PASTURES_FILE,
    PAYMENTS_FILE, SOIL_FILE, read_adoption, read_attributes, read_census, read_eligible,
    read_municipalities, read_pastures, read_payments,
};
use crate::{ColumnFilter, DataResult};

/// File names (relative to the data directory) and column filters for one
/// dataset.  `Default` gives the standard layout without an eligibility
/// list.
#[derive(Clone, Debug)]
pub struct DatasetLayout {
    pub municipalities: PathBuf,
    pub pastures:       PathBuf,
    pub census:         PathBuf,
    pub adoption:       PathBuf,
    pub climate:        PathBuf,
    pub soil:           PathBuf,
    pub payments:       PathBuf,
    /// Municipalities eligible for payments.  `None` means all are.
    pub eligible:       Option<PathBuf>,
    pub census_filter:  ColumnFilter,
    pub climate_filter: ColumnFilter,
    pub soil_filter:    ColumnFilter,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            municipalities: MUNICIPALITIES_FILE.into(),
            pastures:       PASTURES_FILE.into(),
            census:         CENSUS_FILE.into(),
            adoption:       ADOPTION_FILE.into(),
            climate:        CLIMATE_FILE.into(),
            soil:           SOIL_FILE.into(),
            payments:       PAYMENTS_FILE.into(),
            eligible:       None,
            census_filter:  ColumnFilter::census_default(),
            climate_filter: ColumnFilter::climate_default(),
            soil_filter:    ColumnFilter::soil_default(),
        }
    }
}

impl DatasetLayout {
    /// Use the standard eligibility list file name.
    pub fn with_eligibility(mut self) -> Self {
        self.eligible = Some(ELIGIBLE_FILE.into());
        self
    }
}

/// Everything the simulation reads, parsed but not yet validated against the
/// run configuration.
#[derive(Clone, Debug)]
pub struct Dataset {
    /// One record per municipality, in municipality-list order.
    pub records:      Vec<MunicipalityRecord>,
    pub environments: EnvironmentTable,
    pub payments:     PaymentSchedule,
}

/// Load every table named by `layout` from `dir`.
///
/// Municipalities listed in the municipality file but absent from the
/// pastures, census, climate or soil table are collected and reported
/// together as [`AgentError::DataIntegrity`].  A municipality absent from
/// the historic adoption table starts with no history.  Rows for names not
/// in the municipality list are ignored.
pub fn load_dataset(dir: &Path, layout: &DatasetLayout, start_year: Year) -> DataResult<Dataset> {
    let open = |file: &Path| -> DataResult<BufReader<File>> {
        Ok(BufReader::new(File::open(dir.join(file))?))
    };

    let municipalities = read_municipalities(open(&layout.municipalities)?)?;
    let mut pastures = read_pastures(open(&layout.pastures)?)?;
    let mut census = read_census(open(&layout.census)?, &layout.census_filter)?;
    let mut adoption = read_adoption(open(&layout.adoption)?, start_year)?;
    let mut climate = read_attributes(open(&layout.climate)?, &layout.climate_filter, CLIMATE_FILE)?;
    let mut soil = read_attributes(open(&layout.soil)?, &layout.soil_filter, SOIL_FILE)?;

    let mut payments = read_payments(open(&layout.payments)?)?;
    if let Some(file) = &layout.eligible {
        payments = payments.with_eligibility(read_eligible(open(file)?)?);
    }

    let mut problems: Vec<(String, String)> = Vec::new();
    let mut records = Vec::with_capacity(municipalities.len());
    let mut environments = EnvironmentTable::new();

    for (name, district) in municipalities {
        let mut require = |table: &str, present: bool| {
            if !present {
                problems.push((name.clone(), format!("no rows in {table}")));
            }
        };
        let pastures_area = pastures.remove(&name);
        let census_rows = census.remove(&name);
        let climate_row = climate.remove(&name);
        let soil_row = soil.remove(&name);
        require(PASTURES_FILE, pastures_area.is_some());
        require(CENSUS_FILE, census_rows.is_some());
        require(CLIMATE_FILE, climate_row.is_some());
        require(SOIL_FILE, soil_row.is_some());

        let history = adoption.remove(&name);
        if history.is_none() {
            debug!(municipality = %name, "no historic adoption row");
        }

        if let (Some(climate), Some(soil)) = (climate_row, soil_row) {
            environments.insert(name.clone(), Environment::new(climate, soil));
        }
        records.push(MunicipalityRecord {
            name,
            district,
            pastures_area: pastures_area.unwrap_or_default(),
            census:        census_rows.unwrap_or_default(),
            adoption:      history.unwrap_or_default(),
        });
    }

    if !problems.is_empty() {
        return Err(AgentError::data_integrity(problems).into());
    }

    let ignored = pastures.len() + census.len() + climate.len() + soil.len() + adoption.len();
    if ignored > 0 {
        debug!(ignored, "rows for municipalities outside the municipality list");
    }
    info!(
        municipalities = records.len(),
        dir = %dir.display(),
        "dataset loaded"
    );

    Ok(Dataset { records, environments, payments })
}
