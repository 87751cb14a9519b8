//! CSV table readers.
//!
//! # Formats
//!
//! Every table has a header row.  Fixed-layout tables:
//!
//! ```csv
//! Municipality,District
//! Mértola,Beja
//!
//! Municipality,Year,pastures_area_munic_ha
//! Mértola,2009,1520.4
//!
//! Year,sbp_payment
//! 2009,200
//! ```
//!
//! Covariate tables carry key columns followed by any number of value
//! columns, which pass through a [`ColumnFilter`]:
//!
//! ```csv
//! Municipality,Year,lu_cattle,educ_none,...        census (per year)
//! Municipality,clay_mean_munic,pH_mean_munic,...   climate / soil (static)
//! ```
//!
//! Historic adoption is wide, one column per year:
//!
//! ```csv
//! Municipality,1995,1996,1997
//! Mértola,0.0,0.004,0.011
//! ```
//!
//! # Missing values
//!
//! Empty cells and `NA` / `nan` (any case) are missing.  Readers store them
//! as `NaN` so that validation can report every affected municipality at
//! once; anything else that is not a number is a [`DataError::Parse`].

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

use sbp_behavior::PaymentSchedule;
use sbp_core::{FeatureMap, Year};

use crate::{ColumnFilter, DataError, DataResult};

pub const MUNICIPALITY_COLUMN: &str = "Municipality";
pub const YEAR_COLUMN: &str = "Year";

pub const MUNICIPALITIES_FILE: &str = "municipalities.csv";
pub const PASTURES_FILE: &str = "yearly_permanent_pastures_area.csv";
pub const CENSUS_FILE: &str = "census_data_for_abm.csv";
pub const ADOPTION_FILE: &str = "yearly_adoption.csv";
pub const CLIMATE_FILE: &str = "municipalities_average_climate.csv";
pub const SOIL_FILE: &str = "municipalities_soil.csv";
pub const PAYMENTS_FILE: &str = "sbp_payments.csv";
pub const ELIGIBLE_FILE: &str = "municipalities_eligible.csv";

/// Per-municipality yearly values.
pub type YearlySeries = FxHashMap<String, BTreeMap<Year, f64>>;

/// Per-municipality yearly covariate rows.
pub type YearlyTable = FxHashMap<String, BTreeMap<Year, FeatureMap>>;

/// Per-municipality static covariates.
pub type StaticTable = FxHashMap<String, FeatureMap>;

// ── Fixed-layout rows ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MunicipalityRow {
    #[serde(rename = "Municipality")]
    name:     String,
    #[serde(rename = "District")]
    district: String,
}

#[derive(Deserialize)]
struct PasturesRow {
    #[serde(rename = "Municipality")]
    name: String,
    #[serde(rename = "Year")]
    year: u16,
    #[serde(rename = "pastures_area_munic_ha")]
    area: String,
}

#[derive(Deserialize)]
struct PaymentRow {
    #[serde(rename = "Year")]
    year:    u16,
    #[serde(rename = "sbp_payment")]
    payment: String,
}

#[derive(Deserialize)]
struct EligibleRow {
    #[serde(rename = "Municipality")]
    name: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the municipality list as `(name, district)` pairs, in file order.
///
/// The file order defines municipality IDs and the commit order.
pub fn read_municipalities<R: Read>(reader: R) -> DataResult<Vec<(String, String)>> {
    let mut rows = Vec::new();
    for row in csv_reader(reader).deserialize::<MunicipalityRow>() {
        let row = row.map_err(DataError::csv(MUNICIPALITIES_FILE))?;
        rows.push((row.name, row.district));
    }
    debug!(rows = rows.len(), file = MUNICIPALITIES_FILE, "loaded municipalities");
    Ok(rows)
}

/// Read the long-format pastures area table.
pub fn read_pastures<R: Read>(reader: R) -> DataResult<YearlySeries> {
    let mut series = YearlySeries::default();
    let mut count = 0usize;
    for row in csv_reader(reader).deserialize::<PasturesRow>() {
        let row = row.map_err(DataError::csv(PASTURES_FILE))?;
        let area = parse_cell(PASTURES_FILE, &row.area)?;
        let previous = series.entry(row.name.clone()).or_default().insert(Year(row.year), area);
        if previous.is_some() {
            return Err(DataError::parse(
                PASTURES_FILE,
                format!("duplicate row for {} in {}", row.name, row.year),
            ));
        }
        count += 1;
    }
    debug!(rows = count, municipalities = series.len(), file = PASTURES_FILE, "loaded pastures");
    Ok(series)
}

/// Read the census table, keeping the value columns selected by `filter`.
pub fn read_census<R: Read>(reader: R, filter: &ColumnFilter) -> DataResult<YearlyTable> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers().map_err(DataError::csv(CENSUS_FILE))?.clone();
    let name_col = column(&headers, MUNICIPALITY_COLUMN, CENSUS_FILE)?;
    let year_col = column(&headers, YEAR_COLUMN, CENSUS_FILE)?;
    let values = value_columns(&headers, &[name_col, year_col], filter);

    let mut table = YearlyTable::default();
    let mut count = 0usize;
    for record in reader.records() {
        let record = record.map_err(DataError::csv(CENSUS_FILE))?;
        let name = &record[name_col];
        let year = parse_year(CENSUS_FILE, &record[year_col])?;
        let row = feature_row(CENSUS_FILE, &headers, &record, &values)?;
        if table.entry(name.to_owned()).or_default().insert(year, row).is_some() {
            return Err(DataError::parse(
                CENSUS_FILE,
                format!("duplicate row for {name} in {year}"),
            ));
        }
        count += 1;
    }
    debug!(rows = count, columns = values.len(), file = CENSUS_FILE, "loaded census");
    Ok(table)
}

/// Read the wide historic adoption table.  Year columns at or after
/// `start_year` are discarded.
pub fn read_adoption<R: Read>(reader: R, start_year: Year) -> DataResult<YearlySeries> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers().map_err(DataError::csv(ADOPTION_FILE))?.clone();
    let name_col = column(&headers, MUNICIPALITY_COLUMN, ADOPTION_FILE)?;

    let mut years: Vec<(usize, Year)> = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        if i == name_col {
            continue;
        }
        let year = parse_year(ADOPTION_FILE, header)?;
        if year < start_year {
            years.push((i, year));
        }
    }

    let mut series = YearlySeries::default();
    for record in reader.records() {
        let record = record.map_err(DataError::csv(ADOPTION_FILE))?;
        let mut row = BTreeMap::new();
        for &(i, year) in &years {
            row.insert(year, parse_cell(ADOPTION_FILE, &record[i])?);
        }
        let name = &record[name_col];
        if series.insert(name.to_owned(), row).is_some() {
            return Err(DataError::parse(ADOPTION_FILE, format!("duplicate row for {name}")));
        }
    }
    debug!(
        municipalities = series.len(),
        years = years.len(),
        file = ADOPTION_FILE,
        "loaded historic adoption"
    );
    Ok(series)
}

/// Read a static per-municipality table (climate, soil), keeping the value
/// columns selected by `filter`.  `file` labels errors and log lines.
pub fn read_attributes<R: Read>(
    reader: R,
    filter: &ColumnFilter,
    file:   &str,
) -> DataResult<StaticTable> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers().map_err(DataError::csv(file))?.clone();
    let name_col = column(&headers, MUNICIPALITY_COLUMN, file)?;
    let values = value_columns(&headers, &[name_col], filter);

    let mut table = StaticTable::default();
    for record in reader.records() {
        let record = record.map_err(DataError::csv(file))?;
        let name = &record[name_col];
        let row = feature_row(file, &headers, &record, &values)?;
        if table.insert(name.to_owned(), row).is_some() {
            return Err(DataError::parse(file, format!("duplicate row for {name}")));
        }
    }
    debug!(rows = table.len(), columns = values.len(), file, "loaded attributes");
    Ok(table)
}

/// Read the yearly payment table.  Unlike covariates, a missing payment
/// value is a parse error.
pub fn read_payments<R: Read>(reader: R) -> DataResult<PaymentSchedule> {
    let mut by_year = BTreeMap::new();
    for row in csv_reader(reader).deserialize::<PaymentRow>() {
        let row = row.map_err(DataError::csv(PAYMENTS_FILE))?;
        let payment = parse_cell(PAYMENTS_FILE, &row.payment)?;
        if !payment.is_finite() {
            return Err(DataError::parse(
                PAYMENTS_FILE,
                format!("missing payment for {}", row.year),
            ));
        }
        if by_year.insert(Year(row.year), payment).is_some() {
            return Err(DataError::parse(PAYMENTS_FILE, format!("duplicate year {}", row.year)));
        }
    }
    debug!(years = by_year.len(), file = PAYMENTS_FILE, "loaded payments");
    Ok(PaymentSchedule::new(by_year))
}

/// Read the list of municipalities eligible for payments.
pub fn read_eligible<R: Read>(reader: R) -> DataResult<Vec<String>> {
    let mut names = Vec::new();
    for row in csv_reader(reader).deserialize::<EligibleRow>() {
        names.push(row.map_err(DataError::csv(ELIGIBLE_FILE))?.name);
    }
    debug!(rows = names.len(), file = ELIGIBLE_FILE, "loaded eligibility list");
    Ok(names)
}

/// Read a model's ordered feature names: the first row of the file.
pub fn read_feature_names<R: Read>(reader: R, file: &str) -> DataResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let Some(record) = reader.records().next() else {
        return Err(DataError::parse(file, "no feature names"));
    };
    let record = record.map_err(DataError::csv(file))?;
    let names: Vec<String> = record
        .iter()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if names.is_empty() {
        return Err(DataError::parse(file, "no feature names"));
    }
    Ok(names)
}

/// Like [`read_feature_names`] but opens `path`.
pub fn load_feature_names(path: &Path) -> DataResult<Vec<String>> {
    let file = std::fs::File::open(path)?;
    read_feature_names(file, &path.display().to_string())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader)
}

fn column(headers: &csv::StringRecord, name: &str, file: &str) -> DataResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DataError::parse(file, format!("missing column {name:?}")))
}

/// Header indices of the value columns kept by `filter`, in output order.
fn value_columns(headers: &csv::StringRecord, keys: &[usize], filter: &ColumnFilter) -> Vec<usize> {
    let candidates: Vec<usize> = (0..headers.len()).filter(|i| !keys.contains(i)).collect();
    let names: Vec<&str> = candidates.iter().map(|&i| &headers[i]).collect();
    filter.select(&names).into_iter().map(|i| candidates[i]).collect()
}

fn feature_row(
    file:    &str,
    headers: &csv::StringRecord,
    record:  &csv::StringRecord,
    columns: &[usize],
) -> DataResult<FeatureMap> {
    columns
        .iter()
        .map(|&i| -> DataResult<(String, f64)> {
            Ok((headers[i].to_owned(), parse_cell(file, &record[i])?))
        })
        .collect()
}

fn parse_year(file: &str, raw: &str) -> DataResult<Year> {
    raw.parse::<u16>()
        .map(Year)
        .map_err(|_| DataError::parse(file, format!("invalid year {raw:?}")))
}

/// Parse one numeric cell; missing markers become `NaN`.
pub(crate) fn parse_cell(file: &str, raw: &str) -> DataResult<f64> {
    if raw.is_empty() || raw == "NA" || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| DataError::parse(file, format!("invalid number {raw:?}")))
}
